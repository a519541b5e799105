use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum EmployeeId {
    Number(u64),
    Text(String),
}

impl Default for EmployeeId {
    fn default() -> Self {
        Self::Number(0)
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Employment status. The backend only sends `Active` and `Inactive`, but any
/// other value is kept verbatim so it can still be rendered.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum EmployeeStatus {
    Active,
    Inactive,
    Other(String),
}

impl EmployeeStatus {
    pub const OPTIONS: [&'static str; 2] = ["Active", "Inactive"];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Other(s) => s.as_str(),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl Default for EmployeeStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for EmployeeStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Active" => Self::Active,
            "Inactive" => Self::Inactive,
            _ => Self::Other(value),
        }
    }
}

impl From<EmployeeStatus> for String {
    fn from(value: EmployeeStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only projection of one employee as served by the directory API.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Employee {
    #[serde(alias = "_id")]
    pub id: EmployeeId,
    pub name: String,
    pub email: String,
    pub department: String,
    pub designation: String,
    pub status: EmployeeStatus,
    pub joining_date: Option<String>,
    pub salary: f64,
    pub skills: Vec<String>,
    pub legal_entity: String,
    pub sub_entity: String,
}

/// Catalog of selectable filter values, fetched once per view.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterData {
    pub departments: Vec<String>,
    pub designations: Vec<String>,
    pub skills: Vec<String>,
    pub legal_entities: Vec<String>,
    pub sub_entities: BTreeMap<String, Vec<String>>,
}

impl FilterData {
    pub fn sub_entities_for(&self, legal_entity: &str) -> Vec<String> {
        if legal_entity.is_empty() {
            return Vec::new();
        }
        self.sub_entities
            .get(legal_entity)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.departments.is_empty()
            && self.designations.is_empty()
            && self.skills.is_empty()
            && self.legal_entities.is_empty()
            && self.sub_entities.is_empty()
    }
}

/// One page of the employee listing.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeePage {
    pub employees: Vec<Employee>,
    pub total_employees: u64,
}
