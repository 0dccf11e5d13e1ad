//! Redaction policies for string-like values.
//!
//! Policies are pure string transformations. They do not traverse graphs or
//! decide whether a value is sensitive; the classifier picks a policy and the
//! traversal applies it.

use std::borrow::Cow;

/// Placeholder used for full redaction.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

/// Placeholder written over a whole array held under an identifier-batch key.
pub const BATCH_PLACEHOLDER: &str = "[REDACTED DUE TO NRIC OR UINFIN KEY]";

/// Which end of a value a span is measured from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Span {
    Leading(usize),
    Trailing(usize),
}

impl Span {
    /// Index range `[start, end)` covered by this span over `total` characters.
    fn bounds(self, total: usize) -> (usize, usize) {
        match self {
            Span::Leading(count) => (0, count.min(total)),
            Span::Trailing(count) => (total - count.min(total), total),
        }
    }
}

/// A redaction strategy for string-like values.
///
/// All strategies operate on Unicode scalar values.
#[derive(Clone, Debug)]
pub enum TextRedactionPolicy {
    /// Replace the entire value with a fixed placeholder.
    Full {
        placeholder: Cow<'static, str>,
    },
    /// Keep a leading or trailing span visible and mask everything else.
    Keep { visible: SpanConfig, mask_char: char },
    /// Mask a leading or trailing span and leave the remainder untouched.
    Mask { masked: SpanConfig, mask_char: char },
}

/// Span selection for [`TextRedactionPolicy::Keep`] and
/// [`TextRedactionPolicy::Mask`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpanConfig(Span);

impl SpanConfig {
    #[must_use]
    pub fn first(count: usize) -> Self {
        Self(Span::Leading(count))
    }

    #[must_use]
    pub fn last(count: usize) -> Self {
        Self(Span::Trailing(count))
    }
}

impl TextRedactionPolicy {
    /// Full redaction using [`REDACTED_PLACEHOLDER`].
    #[must_use]
    pub fn default_full() -> Self {
        Self::Full {
            placeholder: Cow::Borrowed(REDACTED_PLACEHOLDER),
        }
    }

    /// Full redaction using a custom placeholder.
    #[must_use]
    pub fn full_with<P>(placeholder: P) -> Self
    where
        P: Into<Cow<'static, str>>,
    {
        Self::Full {
            placeholder: placeholder.into(),
        }
    }

    /// Keeps only the first `visible_prefix` characters in clear text.
    #[must_use]
    pub fn keep_first(visible_prefix: usize) -> Self {
        Self::Keep {
            visible: SpanConfig::first(visible_prefix),
            mask_char: '*',
        }
    }

    /// Keeps only the last `visible_suffix` characters in clear text.
    #[must_use]
    pub fn keep_last(visible_suffix: usize) -> Self {
        Self::Keep {
            visible: SpanConfig::last(visible_suffix),
            mask_char: '*',
        }
    }

    /// Masks the first `mask_prefix` characters.
    ///
    /// National identifiers use `mask_first(5)`: `T1234567Z` becomes
    /// `*****567Z`.
    #[must_use]
    pub fn mask_first(mask_prefix: usize) -> Self {
        Self::Mask {
            masked: SpanConfig::first(mask_prefix),
            mask_char: '*',
        }
    }

    /// Masks the last `mask_suffix` characters.
    #[must_use]
    pub fn mask_last(mask_suffix: usize) -> Self {
        Self::Mask {
            masked: SpanConfig::last(mask_suffix),
            mask_char: '*',
        }
    }

    /// Overrides the masking character. No effect on full redaction.
    #[must_use]
    pub fn with_mask_char(mut self, replacement: char) -> Self {
        match &mut self {
            Self::Full { .. } => {}
            Self::Keep { mask_char, .. } | Self::Mask { mask_char, .. } => {
                *mask_char = replacement;
            }
        }
        self
    }

    /// Applies the policy to `value`.
    ///
    /// Keep and mask policies return empty strings unchanged; full redaction
    /// always returns the placeholder.
    #[must_use]
    pub fn apply_to(&self, value: &str) -> String {
        match self {
            Self::Full { placeholder } => placeholder.clone().into_owned(),
            Self::Keep { visible, mask_char } => {
                let total = value.chars().count();
                let (start, end) = visible.0.bounds(total);
                value
                    .chars()
                    .enumerate()
                    .map(|(index, ch)| {
                        if (start..end).contains(&index) {
                            ch
                        } else {
                            *mask_char
                        }
                    })
                    .collect()
            }
            Self::Mask { masked, mask_char } => {
                let total = value.chars().count();
                let (start, end) = masked.0.bounds(total);
                value
                    .chars()
                    .enumerate()
                    .map(|(index, ch)| {
                        if (start..end).contains(&index) {
                            *mask_char
                        } else {
                            ch
                        }
                    })
                    .collect()
            }
        }
    }
}

impl Default for TextRedactionPolicy {
    fn default() -> Self {
        Self::default_full()
    }
}

#[cfg(test)]
mod tests {
    use super::{TextRedactionPolicy, BATCH_PLACEHOLDER, REDACTED_PLACEHOLDER};

    #[test]
    fn full_policy_uses_default_placeholder() {
        let policy = TextRedactionPolicy::default_full();
        assert_eq!(policy.apply_to("secret"), REDACTED_PLACEHOLDER);
        assert_eq!(policy.apply_to(""), REDACTED_PLACEHOLDER);
    }

    #[test]
    fn full_policy_uses_custom_placeholder() {
        let policy = TextRedactionPolicy::full_with(BATCH_PLACEHOLDER);
        assert_eq!(policy.apply_to("S1234567D"), BATCH_PLACEHOLDER);
    }

    #[test]
    fn mask_first_five_hides_identifier_prefix() {
        let policy = TextRedactionPolicy::mask_first(5);
        assert_eq!(policy.apply_to("T1234567Z"), "*****567Z");
    }

    #[test]
    fn mask_policy_masks_first_and_last_segments() {
        assert_eq!(TextRedactionPolicy::mask_first(2).apply_to("abcdef"), "**cdef");
        assert_eq!(TextRedactionPolicy::mask_last(3).apply_to("abcdef"), "abc***");
    }

    #[test]
    fn mask_span_longer_than_value_masks_everything() {
        assert_eq!(TextRedactionPolicy::mask_first(5).apply_to("abc"), "***");
    }

    #[test]
    fn keep_policy_allows_full_visibility() {
        assert_eq!(TextRedactionPolicy::keep_first(3).apply_to("ab"), "ab");
        assert_eq!(TextRedactionPolicy::keep_last(4).apply_to("acct_123456"), "*******3456");
    }

    #[test]
    fn custom_mask_char_applies_to_keep_and_mask() {
        let keep = TextRedactionPolicy::keep_first(2).with_mask_char('#');
        assert_eq!(keep.apply_to("abcdef"), "ab####");

        let mask = TextRedactionPolicy::mask_last(2).with_mask_char('#');
        assert_eq!(mask.apply_to("abcd"), "ab##");

        let full = TextRedactionPolicy::default_full().with_mask_char('#');
        assert_eq!(full.apply_to("abcd"), REDACTED_PLACEHOLDER);
    }

    #[test]
    fn policies_count_unicode_scalars() {
        assert_eq!(TextRedactionPolicy::keep_first(2).apply_to("秘密数据"), "秘密**");
        assert_eq!(TextRedactionPolicy::mask_first(1).apply_to("é1234567Z"), "*1234567Z");
    }

    #[test]
    fn empty_values_stay_empty_for_keep_and_mask() {
        assert_eq!(TextRedactionPolicy::keep_last(4).apply_to(""), "");
        assert_eq!(TextRedactionPolicy::mask_first(4).apply_to(""), "");
    }
}
