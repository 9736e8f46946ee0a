//! Licensor directory served to the client's licensor picker.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Licensor {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String, // "Label" | "Alias" | "Undefined"
}

const LICENSORS: &[(u32, &str, &str)] = &[
    (1, "GOOINN Teknoloji Inovasyon", "Undefined"),
    (2, "(NEW) Mediakraft Networks Gmbh", "Undefined"),
    (3, "(OLD) Mediakraft Networks Gmbh", "Label"),
    (4, "(RED) CEN", "Alias"),
    (5, "(RED) Collective Records", "Alias"),
    (6, "(RED) Equal Vision Records", "Alias"),
    (7, "(RED) Fania", "Alias"),
    (8, "(RED) Megaforce", "Alias"),
    (9, "(RED) Red Bull Records", "Alias"),
    (10, "(RED) Thirty Tigers", "Alias"),
    (11, "(RED) Whatevack", "Alias"),
];

/// The fixed licensor list.
pub fn default_licensors() -> Vec<Licensor> {
    LICENSORS
        .iter()
        .map(|(id, name, kind)| Licensor {
            id: *id,
            name: name.to_string(),
            kind: kind.to_string(),
        })
        .collect()
}
