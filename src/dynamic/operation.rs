//! Request decoding.
//!
//! # Responsibilities
//! - Normalize raw query pairs into a parameter map
//! - Evaluate recognized parameters in a fixed order
//! - Produce a typed `Operation` or reject malformed numbers
//!
//! # Design Decisions
//! - Evaluation order is an explicit table: later entries override the
//!   action chosen by earlier ones, so a parameter field always beats
//!   `add`/`remove`
//! - Presence of a name is the signal; values matter only for `upstream`,
//!   `server` and the numeric fields
//! - Names are case-insensitive; the first occurrence of a repeated name wins

use std::collections::HashMap;

use crate::error::{UpstreamError, UpstreamResult};

/// Request parameters keyed by lower-cased name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: HashMap<String, String>,
}

impl QueryParams {
    /// Build from raw pairs in request order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = HashMap::new();
        for (name, value) in pairs {
            params
                .entry(name.as_ref().to_ascii_lowercase())
                .or_insert_with(|| value.into());
        }
        Self { params }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}

/// Recognized parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Param {
    Upstream,
    Verbose,
    Add,
    Remove,
    Backup,
    Server,
    Weight,
    MaxFails,
    FailTimeout,
    Down,
    Up,
}

/// Order in which parameters are applied. Part of the API contract.
const EVALUATION_ORDER: [Param; 11] = [
    Param::Upstream,
    Param::Verbose,
    Param::Add,
    Param::Remove,
    Param::Backup,
    Param::Server,
    Param::Weight,
    Param::MaxFails,
    Param::FailTimeout,
    Param::Down,
    Param::Up,
];

impl Param {
    fn name(self) -> &'static str {
        match self {
            Param::Upstream => "upstream",
            Param::Verbose => "verbose",
            Param::Add => "add",
            Param::Remove => "remove",
            Param::Backup => "backup",
            Param::Server => "server",
            Param::Weight => "weight",
            Param::MaxFails => "max_fails",
            Param::FailTimeout => "fail_timeout",
            Param::Down => "down",
            Param::Up => "up",
        }
    }
}

/// Policy fields to overwrite on an existing peer. `None` leaves a field alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParamUpdate {
    pub weight: Option<i64>,
    pub max_fails: Option<i64>,
    pub fail_timeout: Option<i64>,
    pub down: Option<bool>,
}

/// What a request asks the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Add,
    Remove,
    UpdateParam(ParamUpdate),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Add => "add",
            Action::Remove => "remove",
            Action::UpdateParam(_) => "update",
        }
    }

    /// Whether the action changes the group and needs its lock.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Action::List)
    }
}

/// A decoded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub action: Action,
    /// Target group name; may be empty, rejected by lookup.
    pub upstream: String,
    pub server: Option<String>,
    pub verbose: bool,
    /// Accepted for compatibility; there is no backup pool.
    pub backup: bool,
}

#[derive(Clone, Copy)]
enum Chosen {
    List,
    Add,
    Remove,
    Param,
}

impl Operation {
    /// Decode request parameters.
    pub fn decode(params: &QueryParams) -> UpstreamResult<Self> {
        let mut chosen = Chosen::List;
        let mut update = ParamUpdate::default();
        let mut op = Operation {
            action: Action::List,
            upstream: String::new(),
            server: None,
            verbose: false,
            backup: false,
        };

        for param in EVALUATION_ORDER {
            let Some(value) = params.get(param.name()) else {
                continue;
            };

            match param {
                Param::Upstream => op.upstream = value.to_string(),
                Param::Verbose => op.verbose = true,
                Param::Add => chosen = Chosen::Add,
                Param::Remove => chosen = Chosen::Remove,
                Param::Backup => op.backup = true,
                Param::Server => op.server = Some(value.to_string()),
                Param::Weight => update.weight = Some(parse_number(param, value)?),
                Param::MaxFails => update.max_fails = Some(parse_number(param, value)?),
                Param::FailTimeout => update.fail_timeout = Some(parse_number(param, value)?),
                Param::Down => update.down = Some(true),
                Param::Up => update.down = Some(false),
            }

            if matches!(
                param,
                Param::Weight | Param::MaxFails | Param::FailTimeout | Param::Down | Param::Up
            ) {
                chosen = Chosen::Param;
                op.verbose = true;
            }
        }

        op.action = match chosen {
            Chosen::List => Action::List,
            Chosen::Add => Action::Add,
            Chosen::Remove => Action::Remove,
            Chosen::Param => Action::UpdateParam(update),
        };
        Ok(op)
    }
}

fn parse_number(param: Param, value: &str) -> UpstreamResult<i64> {
    value.parse().map_err(|_| UpstreamError::InvalidNumber {
        param: param.name(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(pairs: &[(&str, &str)]) -> UpstreamResult<Operation> {
        Operation::decode(&pairs.iter().copied().collect())
    }

    #[test]
    fn test_defaults_to_list() {
        let op = decode(&[("upstream", "backend")]).unwrap();
        assert_eq!(op.action, Action::List);
        assert_eq!(op.upstream, "backend");
        assert!(!op.verbose);
        assert!(op.server.is_none());
    }

    #[test]
    fn test_missing_upstream_is_not_rejected() {
        let op = decode(&[]).unwrap();
        assert_eq!(op.upstream, "");
        assert_eq!(op.action, Action::List);
    }

    #[test]
    fn test_add_and_remove() {
        let op = decode(&[("upstream", "backend"), ("add", ""), ("server", "10.0.0.5:8080")]).unwrap();
        assert_eq!(op.action, Action::Add);
        assert_eq!(op.server.as_deref(), Some("10.0.0.5:8080"));

        let op = decode(&[("remove", ""), ("server", "10.0.0.5:8080")]).unwrap();
        assert_eq!(op.action, Action::Remove);
    }

    #[test]
    fn test_remove_overrides_add() {
        // Request order does not matter, evaluation order does
        let op = decode(&[("remove", ""), ("add", "")]).unwrap();
        assert_eq!(op.action, Action::Remove);
    }

    #[test]
    fn test_param_field_overrides_add_and_forces_verbose() {
        let op = decode(&[("add", ""), ("weight", "5"), ("server", "A")]).unwrap();
        assert_eq!(
            op.action,
            Action::UpdateParam(ParamUpdate {
                weight: Some(5),
                ..ParamUpdate::default()
            })
        );
        assert!(op.verbose);
    }

    #[test]
    fn test_fields_accumulate() {
        let op = decode(&[
            ("server", "A"),
            ("down", ""),
            ("fail_timeout", "30"),
            ("max_fails", "3"),
        ])
        .unwrap();
        assert_eq!(
            op.action,
            Action::UpdateParam(ParamUpdate {
                weight: None,
                max_fails: Some(3),
                fail_timeout: Some(30),
                down: Some(true),
            })
        );
    }

    #[test]
    fn test_down_value_is_ignored_and_up_wins() {
        let op = decode(&[("down", "0")]).unwrap();
        assert_eq!(
            op.action,
            Action::UpdateParam(ParamUpdate {
                down: Some(true),
                ..ParamUpdate::default()
            })
        );

        let op = decode(&[("up", ""), ("down", "")]).unwrap();
        assert_eq!(
            op.action,
            Action::UpdateParam(ParamUpdate {
                down: Some(false),
                ..ParamUpdate::default()
            })
        );
    }

    #[test]
    fn test_invalid_number() {
        let err = decode(&[("upstream", "backend"), ("weight", "abc")]).unwrap_err();
        assert!(matches!(
            err,
            UpstreamError::InvalidNumber { param: "weight", ref value } if value == "abc"
        ));

        assert!(decode(&[("max_fails", "")]).is_err());
        assert!(decode(&[("fail_timeout", "1.5")]).is_err());
        assert!(decode(&[("weight", "99999999999999999999")]).is_err());
    }

    #[test]
    fn test_negative_and_zero_accepted() {
        let op = decode(&[("weight", "0"), ("max_fails", "-1")]).unwrap();
        assert_eq!(
            op.action,
            Action::UpdateParam(ParamUpdate {
                weight: Some(0),
                max_fails: Some(-1),
                ..ParamUpdate::default()
            })
        );
    }

    #[test]
    fn test_backup_is_inert() {
        let op = decode(&[("backup", ""), ("server", "A")]).unwrap();
        assert!(op.backup);
        assert_eq!(op.action, Action::List);
    }

    #[test]
    fn test_names_case_insensitive_first_wins() {
        let params = QueryParams::from_pairs([
            ("UPSTREAM", "first"),
            ("upstream", "second"),
            ("Verbose", ""),
        ]);
        let op = Operation::decode(&params).unwrap();
        assert_eq!(op.upstream, "first");
        assert!(op.verbose);
    }

    #[test]
    fn test_up_without_server_is_an_update() {
        let op = decode(&[("upstream", "backend"), ("up", "")]).unwrap();
        assert_eq!(
            op.action,
            Action::UpdateParam(ParamUpdate {
                down: Some(false),
                ..ParamUpdate::default()
            })
        );
        assert!(op.server.is_none());
        assert!(op.verbose);
    }
}
