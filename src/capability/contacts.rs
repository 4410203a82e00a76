use std::{
    collections::BTreeSet,
    sync::{Arc, RwLock},
};

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub categories: BTreeSet<String>,
}

impl Contact {
    pub fn new<'a>(
        name: impl Into<String>,
        phone: impl Into<String>,
        categories: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            categories: categories.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn in_category(&self, category: &str) -> bool {
        self.categories.contains(category)
    }
}

/// Read-only view of the externally owned contact list.
pub trait ContactStore: Send {
    fn contacts(&self) -> Vec<Contact>;
}

impl ContactStore for Vec<Contact> {
    fn contacts(&self) -> Vec<Contact> {
        self.clone()
    }
}

/// Contact list shared with an editor that may replace it at any time.
impl ContactStore for Arc<RwLock<Vec<Contact>>> {
    fn contacts(&self) -> Vec<Contact> {
        self.read()
            .map(|contacts| contacts.clone())
            .unwrap_or_default()
    }
}

/// Contacts an alert should reach; `None` selects everyone.
pub fn select_recipients(contacts: Vec<Contact>, category: Option<&str>) -> Vec<Contact> {
    match category {
        Some(category) => contacts
            .into_iter()
            .filter(|contact| contact.in_category(category))
            .collect(),
        None => contacts,
    }
}
