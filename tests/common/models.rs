//! Serde models of the `complex` document used across the scenario tests

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename = "complex")]
pub struct ComplexBean {
    #[serde(rename = "@name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "@number", default, skip_serializing_if = "Option::is_none")]
    pub number: Option<i64>,
    #[serde(rename = "@date", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub things: Option<Things>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub others: Option<Others>,
    #[serde(rename = "aString", default, skip_serializing_if = "Option::is_none")]
    pub a_string: Option<String>,
    #[serde(rename = "aNumber", default, skip_serializing_if = "Option::is_none")]
    pub a_number: Option<i64>,
    #[serde(rename = "aDateWithZone", default, skip_serializing_if = "Option::is_none")]
    pub a_date_with_zone: Option<String>,
    #[serde(rename = "sthcomplex", default, skip_serializing_if = "Option::is_none")]
    pub complex_element: Option<Box<ComplexThing>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplexThing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub others: Option<Others>,
    #[serde(rename = "aString", default, skip_serializing_if = "Option::is_none")]
    pub a_string: Option<String>,
    #[serde(rename = "aNumber", default, skip_serializing_if = "Option::is_none")]
    pub a_number: Option<i64>,
    #[serde(rename = "aDateWithZone", default, skip_serializing_if = "Option::is_none")]
    pub a_date_with_zone: Option<String>,
    #[serde(rename = "sthcomplex", default, skip_serializing_if = "Option::is_none")]
    pub complex_element: Option<Box<ComplexThing>>,
}

/// `<things>` wrapper
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Things {
    #[serde(default)]
    pub thing: Vec<ComplexThing>,
}

/// `<others>` wrapper
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Others {
    #[serde(default)]
    pub other: Vec<String>,
}

impl Others {
    pub fn new(values: impl IntoIterator<Item = String>) -> Self {
        Others {
            other: values.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.other.len()
    }
}
