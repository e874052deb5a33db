// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ordered argument accumulation shared by every builder.

/// Accumulates a tart argument list, skipping flags whose values are at
/// their defaults.
///
/// * boolean flags are emitted only when `true`;
/// * value flags only for non-empty strings and non-zero numbers;
/// * repeated flags and positionals always, verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct ArgList(Vec<String>);

impl ArgList {
    /// Start a list with the given subcommand.
    pub fn new(subcommand: &str) -> Self {
        Self(vec![subcommand.to_string()])
    }

    /// `flag` when `on`.
    pub fn flag(mut self, flag: &str, on: bool) -> Self {
        if on {
            self.0.push(flag.to_string());
        }
        self
    }

    /// `flag value` when `value` is present and non-empty.
    pub fn value(mut self, flag: &str, value: Option<&str>) -> Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.0.push(flag.to_string());
            self.0.push(v.to_string());
        }
        self
    }

    /// `flag N` when `value` is present and positive.
    pub fn number<N: Into<u64>>(self, flag: &str, value: Option<N>) -> Self {
        match value.map(Into::into) {
            Some(n) if n > 0 => self.value(flag, Some(&n.to_string())),
            _ => self,
        }
    }

    /// One `flag value` pair per element, in order. Every element is
    /// emitted, empty ones included.
    pub fn repeated<I, S>(mut self, flag: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for v in values {
            self.0.push(flag.to_string());
            self.0.push(v.as_ref().to_string());
        }
        self
    }

    /// A positional argument.
    pub fn positional(mut self, value: impl Into<String>) -> Self {
        self.0.push(value.into());
        self
    }

    /// The finished argument list.
    pub fn into_args(self) -> Vec<String> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_defaults() {
        let args = ArgList::new("x")
            .flag("--off", false)
            .value("--empty", Some(""))
            .value("--none", None)
            .number("--zero", Some(0u32))
            .number::<u32>("--unset", None)
            .into_args();
        assert_eq!(args, vec!["x"]);
    }

    #[test]
    fn emits_set_values_in_call_order() {
        let args = ArgList::new("x")
            .number("--n", Some(4u32))
            .flag("--on", true)
            .value("--s", Some("v"))
            .repeated("--r", ["a", "b"])
            .positional("name")
            .into_args();
        assert_eq!(
            args,
            vec!["x", "--n", "4", "--on", "--s", "v", "--r", "a", "--r", "b", "name"]
        );
    }

    #[test]
    fn repeated_keeps_every_element() {
        let args = ArgList::new("x").repeated("--r", ["a", "", "b"]).into_args();
        assert_eq!(args, vec!["x", "--r", "a", "--r", "", "--r", "b"]);
    }
}
