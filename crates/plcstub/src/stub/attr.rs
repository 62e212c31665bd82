// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Attribute-string parsing for tag creation requests.
//!
//! Creation requests arrive as libplctag-style `key=value&key=value` strings,
//! e.g. `protocol=ab_eip&gateway=10.206.1.40&name=TestInsert&elem_count=1`.
//! Only `name` matters to the stub; `elem_size` and `elem_count` are accepted
//! and discarded, everything else is ignored.

use crate::error::{Error, Result};

/// The parts of an attribute string the stub acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CreateRequest {
    pub name: String,
}

/// Parse a creation attribute string.
///
/// A bare token without `=` is only tolerated for `protocol`; anything else
/// malformed is a `BadParam`. A missing `name` key is a `BadParam`.
pub(crate) fn parse(attrs: &str) -> Result<CreateRequest> {
    let mut name: Option<&str> = None;

    for token in attrs.split('&').filter(|t| !t.is_empty()) {
        let Some((key, value)) = token.split_once('=') else {
            if token == "protocol" {
                continue;
            }
            log::warn!("[Stub] Missing '=' in non-'protocol' attribute {}", token);
            return Err(Error::BadParam(format!(
                "malformed attribute token: {}",
                token
            )));
        };

        match key {
            "name" => {
                if name.is_some() {
                    log::warn!("[Stub] Overwriting attribute name");
                }
                name = Some(value);
            }
            "elem_size" | "elem_count" => {
                log::warn!("[Stub] Discarding attribute {}={}", key, value);
            }
            _ => {
                log::debug!("[Stub] Ignoring attribute {}={}", key, value);
            }
        }
    }

    let name = name.ok_or_else(|| Error::BadParam("missing attribute name".into()))?;
    Ok(CreateRequest {
        name: name.to_string(),
    })
}
