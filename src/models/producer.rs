use serde::{Deserialize, Serialize};

/// A persisted energy producer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Producer {
    pub id: i64,
    pub name: String,
    pub contact: String,
    pub address: String,
    pub products: String,
    pub category: String,
}

/// The user-editable fields of a producer, as entered or imported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerFields {
    pub name: String,
    pub contact: String,
    pub address: String,
    pub products: String,
    pub category: String,
}

impl ProducerFields {
    pub fn new(
        name: impl Into<String>,
        contact: impl Into<String>,
        address: impl Into<String>,
        products: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            contact: contact.into(),
            address: address.into(),
            products: products.into(),
            category: category.into(),
        }
    }

    /// Copy with every field trimmed of surrounding whitespace.
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            contact: self.contact.trim().to_string(),
            address: self.address.trim().to_string(),
            products: self.products.trim().to_string(),
            category: self.category.trim().to_string(),
        }
    }
}

impl From<&Producer> for ProducerFields {
    fn from(p: &Producer) -> Self {
        Self {
            name: p.name.clone(),
            contact: p.contact.clone(),
            address: p.address.clone(),
            products: p.products.clone(),
            category: p.category.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trimmed_strips_every_field() {
        let fields = ProducerFields::new("  Helios ", "\tmail@helios.test", " Oslo ", " Panels\n", " Solar ");
        let t = fields.trimmed();
        assert_eq!(t, ProducerFields::new("Helios", "mail@helios.test", "Oslo", "Panels", "Solar"));
    }
}
