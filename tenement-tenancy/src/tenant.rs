//! Tenant Identity
//!
//! A website is the unit of isolation: a stable numeric id plus a
//! human-readable identifier that may be renamed.

use serde::{Deserialize, Serialize};

/// Tenant website identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Website {
    /// Stable numeric id
    pub id: u64,

    /// Current identifier (slug), unique across tenants
    pub identifier: String,

    /// Identifier before a pending rename
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_identifier: Option<String>,

    /// Owning customer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<u64>,
}

impl Website {
    /// Create a new website
    ///
    /// # Examples
    ///
    /// ```
    /// use tenement_tenancy::Website;
    ///
    /// let website = Website::new(42, "acme");
    /// assert!(!website.is_identifier_dirty());
    /// ```
    pub fn new(id: u64, identifier: impl Into<String>) -> Self {
        Self {
            id,
            identifier: identifier.into(),
            previous_identifier: None,
            customer_id: None,
        }
    }

    /// Set the owning customer
    pub fn with_customer(mut self, customer_id: u64) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    /// Change the identifier, remembering the one in effect before
    ///
    /// Successive renames keep the first original so the directory still on
    /// disk can be found. Renaming back to the original clears the rename.
    ///
    /// # Examples
    ///
    /// ```
    /// use tenement_tenancy::Website;
    ///
    /// let mut website = Website::new(42, "acme");
    /// website.rename("acme-corp");
    /// assert_eq!(website.previous_identifier.as_deref(), Some("acme"));
    /// ```
    pub fn rename(&mut self, identifier: impl Into<String>) {
        let identifier = identifier.into();
        if identifier == self.identifier {
            return;
        }

        let original = self
            .previous_identifier
            .take()
            .unwrap_or_else(|| std::mem::take(&mut self.identifier));

        self.previous_identifier = (original != identifier).then_some(original);
        self.identifier = identifier;
    }

    /// Whether the identifier differs from the last persisted one
    pub fn is_identifier_dirty(&self) -> bool {
        self.previous_identifier
            .as_deref()
            .is_some_and(|previous| previous != self.identifier)
    }

    /// Identifier last persisted (the current one if never renamed)
    pub fn original_identifier(&self) -> &str {
        self.previous_identifier
            .as_deref()
            .unwrap_or(&self.identifier)
    }

    /// Forget the previous identifier once the rename is settled
    pub fn sync_original(&mut self) {
        self.previous_identifier = None;
    }

    /// Directory name for this tenant: `{id}-{identifier}`
    pub fn directory_name(&self) -> String {
        format!("{}-{}", self.id, self.identifier)
    }
}
