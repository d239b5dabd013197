// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use super::ids::{ElementId, IdError};

/// Narrows queries to a subtree of a project.
///
/// Canonical format: `mdel://<element_id>`. The bare `mdel://` form (or an empty string)
/// denotes the project's primary model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RootLocator {
    PrimaryModel,
    Element(ElementId),
}

impl RootLocator {
    pub const SCHEME: &'static str = "mdel://";

    pub fn element(id: ElementId) -> Self {
        Self::Element(id)
    }

    pub fn parse(input: &str) -> Result<Self, ParseLocatorError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Self::PrimaryModel);
        }
        let rest = input.strip_prefix(Self::SCHEME).ok_or(ParseLocatorError::MissingScheme)?;
        let rest = rest.trim_end_matches('/');
        if rest.is_empty() {
            return Ok(Self::PrimaryModel);
        }
        ElementId::new(rest.to_owned()).map(Self::Element).map_err(ParseLocatorError::InvalidElementId)
    }
}

impl fmt::Display for RootLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrimaryModel => f.write_str(Self::SCHEME),
            Self::Element(id) => write!(f, "{}{id}", Self::SCHEME),
        }
    }
}

impl FromStr for RootLocator {
    type Err = ParseLocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseLocatorError {
    #[error("root locator must start with `mdel://`")]
    MissingScheme,
    #[error("invalid element id in root locator: {0}")]
    InvalidElementId(IdError),
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", RootLocator::PrimaryModel)]
    #[case("mdel://", RootLocator::PrimaryModel)]
    #[case("  mdel:///  ", RootLocator::PrimaryModel)]
    fn parses_primary_model_forms(#[case] input: &str, #[case] expected: RootLocator) {
        assert_eq!(RootLocator::parse(input).expect("parse"), expected);
    }

    #[test]
    fn parses_element_locators_and_round_trips_display() {
        let locator = RootLocator::parse("mdel://_zoo_pkg").expect("parse");
        assert_eq!(locator, RootLocator::Element(ElementId::new("_zoo_pkg").expect("id")));
        assert_eq!(locator.to_string(), "mdel://_zoo_pkg");
    }

    #[rstest]
    #[case("http://x", ParseLocatorError::MissingScheme)]
    #[case("mdel://a/b", ParseLocatorError::InvalidElementId(IdError::ContainsSlash))]
    fn rejects_malformed_locators(#[case] input: &str, #[case] expected: ParseLocatorError) {
        assert_eq!(RootLocator::parse(input).unwrap_err(), expected);
    }
}
