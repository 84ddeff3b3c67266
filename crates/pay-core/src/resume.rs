//! # Return-from-Redirect Resumption
//!
//! After paying on the wallet page the buyer lands back on the checkout
//! URL with `?payment_intent=<id>`. The process may be brand new at that
//! point, so the intent id is recovered from the URL rather than memory.
//! The parameter is consumed exactly once and removed from the visible
//! address, so a later reload does not start polling again.

use crate::error::{PaymentError, PaymentResult};
use std::fmt;
use tracing::{debug, info};
use url::Url;

/// Query parameter carrying the intent id on the return URL
pub const RESUMPTION_PARAM: &str = "payment_intent";

/// Validated intent id taken from a return URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumptionToken {
    intent_id: String,
}

impl ResumptionToken {
    /// Validate a raw parameter value
    pub fn parse(raw: &str) -> PaymentResult<Self> {
        let intent_id = raw.trim();
        if intent_id.is_empty() {
            return Err(PaymentError::InvalidResumeToken(format!(
                "{} is empty",
                RESUMPTION_PARAM
            )));
        }
        if intent_id.chars().any(char::is_control) {
            return Err(PaymentError::InvalidResumeToken(format!(
                "{} contains control characters",
                RESUMPTION_PARAM
            )));
        }
        Ok(Self {
            intent_id: intent_id.to_string(),
        })
    }

    pub fn intent_id(&self) -> &str {
        &self.intent_id
    }

    pub fn into_intent_id(self) -> String {
        self.intent_id
    }
}

impl fmt::Display for ResumptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.intent_id)
    }
}

/// The current navigation entry (address bar) of the checkout view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    url: Url,
}

impl Navigation {
    pub fn parse(address: &str) -> PaymentResult<Self> {
        let url = Url::parse(address).map_err(|e| {
            PaymentError::InvalidRequest(format!("invalid return URL {}: {}", address, e))
        })?;
        Ok(Self { url })
    }

    /// The address as it should currently be shown
    pub fn visible_url(&self) -> &str {
        self.url.as_str()
    }

    /// True if the address still carries a resumption parameter
    pub fn has_resumption(&self) -> bool {
        self.url.query_pairs().any(|(k, _)| k == RESUMPTION_PARAM)
    }

    /// Consume the resumption parameter.
    ///
    /// Every occurrence is stripped from the visible address whether or
    /// not the value is valid; other query parameters and the fragment are
    /// kept. Returns `None` when there is nothing to resume.
    pub fn take_resumption(&mut self) -> PaymentResult<Option<ResumptionToken>> {
        let mut first = None;
        let mut kept = Vec::new();
        for (key, value) in self.url.query_pairs() {
            if key == RESUMPTION_PARAM {
                if first.is_none() {
                    first = Some(value.into_owned());
                }
            } else {
                kept.push((key.into_owned(), value.into_owned()));
            }
        }

        let Some(raw) = first else {
            return Ok(None);
        };

        if kept.is_empty() {
            self.url.set_query(None);
        } else {
            self.url.query_pairs_mut().clear().extend_pairs(kept);
        }
        debug!("Stripped {} from address: {}", RESUMPTION_PARAM, self.url);

        let token = ResumptionToken::parse(&raw)?;
        info!("Returned from wallet redirect, intent={}", token);
        Ok(Some(token))
    }
}
