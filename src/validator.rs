//! Validator combinators.
//!
//! A [`Validator<T>`] is a pure function `&T -> ValidationResult`. Validators
//! are cheap to clone (the check is shared behind an `Arc`) and can be chained
//! with [`and`](Validator::and). Chaining short-circuits: the first failing
//! clause's result is returned and later clauses are not evaluated, so a chain
//! reports a single message. Aggregation across different paths happens at
//! the snapshot level ([`Config::validate`](crate::Config::validate)).
//!
//! Validators never reach into records. [`all_match`](Validator::all_match) on
//! a list of records sees each record as a whole map.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::SnapfigError;
use crate::validation::ValidationResult;

type Check<T> = dyn Fn(&T) -> ValidationResult + Send + Sync;

pub struct Validator<T> {
    check: Arc<Check<T>>,
}

impl<T> Clone for Validator<T> {
    fn clone(&self) -> Self {
        Self {
            check: Arc::clone(&self.check),
        }
    }
}

impl<T> fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator")
    }
}

impl<T: 'static> Default for Validator<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T: 'static> Validator<T> {
    /// Wrap an arbitrary check.
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&T) -> ValidationResult + Send + Sync + 'static,
    {
        Self {
            check: Arc::new(check),
        }
    }

    /// Always succeeds.
    pub fn none() -> Self {
        Self::new(|_| ValidationResult::valid())
    }

    /// Fails with `message` whenever `predicate` returns false.
    pub fn of<F>(predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        Self::new(move |value| {
            if predicate(value) {
                ValidationResult::valid()
            } else {
                ValidationResult::invalid(message.clone())
            }
        })
    }

    /// Run `self`, then `other` only if `self` passed.
    pub fn and(self, other: Validator<T>) -> Self {
        Self::new(move |value| {
            let first = (self.check)(value);
            if !first.is_valid() {
                return first;
            }
            (other.check)(value)
        })
    }

    pub fn validate(&self, value: &T) -> ValidationResult {
        (self.check)(value)
    }
}

// --- Ordered values (integers, floats) ---

impl<T> Validator<T>
where
    T: PartialOrd + fmt::Display + Send + Sync + 'static,
{
    /// Inclusive on both ends.
    pub fn range(min: T, max: T) -> Self {
        let message = format!("Value must be between {min} and {max}");
        Self::of(move |v| *v >= min && *v <= max, message)
    }

    pub fn min(min: T) -> Self {
        let message = format!("Value must be at least {min}");
        Self::of(move |v| *v >= min, message)
    }

    pub fn max(max: T) -> Self {
        let message = format!("Value must be at most {max}");
        Self::of(move |v| *v <= max, message)
    }
}

// --- Membership ---

impl<T> Validator<T>
where
    T: PartialEq + fmt::Display + Send + Sync + 'static,
{
    /// Passes when the value equals one of `allowed`.
    pub fn one_of<I, V>(allowed: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<T>,
    {
        let allowed: Vec<T> = allowed.into_iter().map(Into::into).collect();
        let listed: Vec<String> = allowed.iter().map(ToString::to_string).collect();
        let message = format!("Value must be one of: [{}]", listed.join(", "));
        Self::of(move |v| allowed.contains(v), message)
    }
}

// --- Text ---

impl Validator<String> {
    /// Rejects empty and whitespace-only text.
    pub fn not_empty() -> Self {
        Self::of(|s: &String| !s.trim().is_empty(), "Value cannot be empty")
    }

    /// Length in characters, inclusive bounds.
    pub fn length(min: usize, max: usize) -> Self {
        Self::of(
            move |s: &String| {
                let len = s.chars().count();
                len >= min && len <= max
            },
            format!("Length must be between {min} and {max}"),
        )
    }

    /// The whole value must match `pattern`.
    pub fn matches(pattern: &str) -> Result<Self, SnapfigError> {
        let regex = full_match(pattern)?;
        Ok(Self::of(
            move |s: &String| regex.is_match(s),
            format!("Value must match pattern: {pattern}"),
        ))
    }
}

// --- Lists ---

impl<T> Validator<Vec<T>>
where
    T: Send + Sync + 'static,
{
    pub fn min_size(min: usize) -> Self {
        Self::of(
            move |list: &Vec<T>| list.len() >= min,
            format!("List must have at least {min} elements"),
        )
    }

    pub fn max_size(max: usize) -> Self {
        Self::of(
            move |list: &Vec<T>| list.len() <= max,
            format!("List cannot exceed {max} elements"),
        )
    }

    pub fn size_range(min: usize, max: usize) -> Self {
        Self::of(
            move |list: &Vec<T>| list.len() >= min && list.len() <= max,
            format!("List size must be between {min} and {max}"),
        )
    }

    /// Every element must satisfy `predicate`.
    pub fn all_match<F>(predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::of(move |list: &Vec<T>| list.iter().all(&predicate), message)
    }

    /// Distinct count must equal the list length.
    pub fn no_duplicates() -> Self
    where
        T: PartialEq,
    {
        Self::of(
            |list: &Vec<T>| {
                list.iter()
                    .enumerate()
                    .all(|(i, item)| !list[..i].contains(item))
            },
            "List cannot contain duplicates",
        )
    }

    /// Every element within `min..=max`.
    pub fn all_in_range(min: T, max: T) -> Self
    where
        T: PartialOrd + fmt::Display,
    {
        let message = format!("All elements must be between {min} and {max}");
        Self::of(
            move |list: &Vec<T>| list.iter().all(|v| *v >= min && *v <= max),
            message,
        )
    }
}

impl Validator<Vec<String>> {
    pub fn all_not_empty() -> Self {
        Self::all_match(|s: &String| !s.trim().is_empty(), "All strings must be non-empty")
    }

    pub fn all_match_pattern(pattern: &str) -> Result<Self, SnapfigError> {
        let regex = full_match(pattern)?;
        Ok(Self::all_match(
            move |s: &String| regex.is_match(s),
            format!("All strings must match pattern: {pattern}"),
        ))
    }
}

/// Compile `pattern` anchored at both ends.
fn full_match(pattern: &str) -> Result<Regex, SnapfigError> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|source| SnapfigError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
