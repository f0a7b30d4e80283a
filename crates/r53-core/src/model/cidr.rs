use serde::{Deserialize, Serialize};

/// A CIDR collection used by CIDR routing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CidrCollection {
    pub id: String,
    pub arn: String,
    pub name: String,
    pub version: i64,
}

/// One CIDR block of a named location
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CidrBlock {
    pub cidr_block: String,
    pub location_name: String,
}

/// Action of a CIDR collection change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CidrChangeAction {
    PutCidr,
    DeleteIfExists,
}

impl CidrChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CidrChangeAction::PutCidr => "PUT_CIDR",
            CidrChangeAction::DeleteIfExists => "DELETE_IF_EXISTS",
        }
    }
}

/// One entry of a `ChangeCidrCollection` batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CidrCollectionChange {
    pub location_name: String,
    pub action: CidrChangeAction,
    pub cidr_list: Vec<String>,
}
