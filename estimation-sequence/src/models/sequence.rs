use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::chain::SequenceChain;
use crate::models::value::{RawItem, Value};
use crate::resolver;
use crate::{Error, Result};

/// A named collection of estimation values used by consensus sessions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Sequence {
    pub name: String,
    pub created_at: DateTime<Utc>,
    chain: SequenceChain,
}

impl Sequence {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: Utc::now(),
            chain: SequenceChain::new(),
        }
    }

    /// Populate the sequence from a bulk-create payload. A sequence
    /// obtains values at most once; call `remove_values` first to
    /// repopulate.
    pub fn populate(&mut self, items: Vec<RawItem>) -> Result<&[Value]> {
        if !self.chain.is_empty() {
            return Err(Error::ResourceAlreadyExists(format!(
                "Sequence {} already has values",
                self.name
            )));
        }
        self.chain = SequenceChain::build(items);
        Ok(self.chain.values())
    }

    /// Drop all values at once. The sequence owns its values, so nothing
    /// outlives the removal.
    pub fn remove_values(&mut self) {
        self.chain = SequenceChain::new();
    }

    pub fn chain(&self) -> &SequenceChain {
        &self.chain
    }

    /// Values in display order.
    pub fn sorted_values(&self) -> Vec<&Value> {
        self.chain.sorted()
    }

    /// The value in this sequence closest to the given target, e.g. the
    /// mean of several users' picks.
    pub fn closest_possible_value(&self, target: Decimal, round_up: bool) -> Option<&Value> {
        resolver::closest(&self.chain, target, round_up)
    }

    pub fn dump(&self, with_values: bool) -> serde_json::Value {
        let mut data = serde_json::json!({
            "name": self.name,
            "created_at": self.created_at.to_rfc3339(),
        });

        if with_values {
            let values: Vec<serde_json::Value> = self
                .sorted_values()
                .iter()
                .map(|value| value.dump())
                .collect();
            data["values"] = serde_json::Value::Array(values);
        }

        data
    }
}
