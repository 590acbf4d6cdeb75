use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a value measures. Numeric values carry a magnitude and the chain
/// links; label-only values ("Coffee", "?") carry neither.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum ValueKind {
    Numeric {
        magnitude: Decimal,
        previous: Option<Uuid>,
        next: Option<Uuid>,
    },
    Label,
}

/// A single estimable unit of a sequence.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Value {
    pub id: Uuid,
    pub name: Option<String>,
    pub kind: ValueKind,
    pub created_at: DateTime<Utc>,
}

impl Value {
    /// Create an unlinked numeric value with a fresh identifier.
    pub fn numeric(magnitude: Decimal, name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            kind: ValueKind::Numeric {
                magnitude,
                previous: None,
                next: None,
            },
            created_at: Utc::now(),
        }
    }

    /// Create a label-only value with a fresh identifier.
    pub fn label(name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            kind: ValueKind::Label,
            created_at: Utc::now(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, ValueKind::Numeric { .. })
    }

    pub fn magnitude(&self) -> Option<Decimal> {
        match self.kind {
            ValueKind::Numeric { magnitude, .. } => Some(magnitude),
            ValueKind::Label => None,
        }
    }

    pub fn previous(&self) -> Option<Uuid> {
        match self.kind {
            ValueKind::Numeric { previous, .. } => previous,
            ValueKind::Label => None,
        }
    }

    pub fn next(&self) -> Option<Uuid> {
        match self.kind {
            ValueKind::Numeric { next, .. } => next,
            ValueKind::Label => None,
        }
    }

    /// Set the chain links. Label-only values never carry links, so this
    /// is a no-op for them.
    pub(crate) fn set_links(&mut self, prev_id: Option<Uuid>, next_id: Option<Uuid>) {
        if let ValueKind::Numeric {
            ref mut previous,
            ref mut next,
            ..
        } = self.kind
        {
            *previous = prev_id;
            *next = next_id;
        }
    }

    /// Secondary ordinal for sorting label-only values: the name, or the
    /// identifier for unnamed values. Unnamed values sort after named
    /// ones, so the identifier only orders within the unnamed tail.
    pub(crate) fn label_sort_key(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }

    /// Wire shape exchanged with HTTP callers: `{id, name?, value}` where
    /// `value` is a float or null.
    pub fn dump(&self) -> serde_json::Value {
        let mut payload = serde_json::json!({
            "id": self.id,
        });

        if let Some(name) = &self.name {
            payload["name"] = serde_json::json!(name);
        }

        match self.magnitude().and_then(|m| m.to_f64()) {
            Some(magnitude) => payload["value"] = serde_json::json!(magnitude),
            None => payload["value"] = serde_json::Value::Null,
        }

        payload
    }
}

/// One item of a bulk-create payload: `{name?, value?}`. The magnitude is
/// accepted as any JSON value and parsed leniently.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RawItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

impl RawItem {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            value: None,
        }
    }

    pub fn numeric(value: f64) -> Self {
        Self {
            name: None,
            value: serde_json::Number::from_f64(value).map(serde_json::Value::Number),
        }
    }

    /// Parse the magnitude as an exact decimal. A present but unparseable
    /// magnitude downgrades the item to label-only and is logged so
    /// malformed payloads stay observable.
    pub(crate) fn parse_magnitude(&self) -> Option<Decimal> {
        let raw = self.value.as_ref()?;
        if raw.is_null() {
            return None;
        }

        let parsed = match raw {
            serde_json::Value::Number(number) => decimal_from_repr(&number.to_string()),
            serde_json::Value::String(text) => decimal_from_repr(text.trim()),
            _ => None,
        };

        if parsed.is_none() {
            log::error!("Value({}) was not a decimal and will use None", raw);
        }

        parsed
    }
}

fn decimal_from_repr(repr: &str) -> Option<Decimal> {
    Decimal::from_str(repr)
        .or_else(|_| Decimal::from_scientific(repr))
        .ok()
}
