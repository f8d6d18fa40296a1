use serde::{Deserialize, Serialize};

/// A bakery branch that can carry monthly targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub is_active: bool,
}

impl Branch {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            is_active: true,
        }
    }
}
