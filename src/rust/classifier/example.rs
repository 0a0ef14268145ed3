use std::fmt;
use std::str::FromStr;

use super::error::LearnerError;

/// Characters with a structural meaning in the example line format.
const RESERVED: [char; 2] = ['|', ':'];

/// A single named feature with its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub name: String,
    pub value: f32,
}

/// A named group of features. The empty name is the default namespace.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Namespace {
    pub name: String,
    pub features: Vec<Feature>,
}

/// An encoded unit consumed by the learner: feature namespaces plus an optional label.
///
/// The textual form is one line per example:
///
/// ```text
/// [label] |namespace token[:value] token ... |namespace2 ...
/// ```
///
/// `1` marks ham and `-1` marks spam. A segment starting with whitespace belongs
/// to the default namespace.
///
/// ```rust
/// use spam_labeler::Example;
///
/// let example: Example = "-1 |subject cheap pills |content buy:2".parse().unwrap();
/// assert_eq!(example.label(), Some(-1.0));
/// assert_eq!(example.namespaces().len(), 2);
/// assert_eq!(example.to_string(), "-1 |subject cheap pills |content buy:2");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Example {
    label: Option<f32>,
    namespaces: Vec<Namespace>,
}

/// Strips the reserved characters from a token so it survives the line format.
pub fn sanitize_token(token: &str) -> String {
    token.chars().filter(|c| !RESERVED.contains(c)).collect()
}

impl Example {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: f32) -> Self {
        self.label = Some(label);
        self
    }

    /// Appends a namespace whose tokens each become a feature of value 1.
    ///
    /// Reserved characters are removed from the name and the tokens; tokens that end
    /// up empty are dropped.
    pub fn with_namespace<I, S>(mut self, name: &str, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let features = tokens
            .into_iter()
            .map(|token| sanitize_token(token.as_ref()))
            .filter(|token| !token.is_empty())
            .map(|name| Feature { name, value: 1.0 })
            .collect();
        self.namespaces.push(Namespace {
            name: sanitize_token(name).split_whitespace().collect(),
            features,
        });
        self
    }

    pub fn label(&self) -> Option<f32> {
        self.label
    }

    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    /// The same features with the label removed, as used for scoring.
    pub fn unlabeled(&self) -> Self {
        Self {
            label: None,
            namespaces: self.namespaces.clone(),
        }
    }

    pub fn feature_count(&self) -> usize {
        self.namespaces.iter().map(|ns| ns.features.len()).sum()
    }
}

fn parse_feature(token: &str) -> Result<Feature, LearnerError> {
    let (name, value) = match token.split_once(':') {
        Some((name, raw)) => {
            let value = raw.parse::<f32>().map_err(|_| {
                LearnerError::MalformedExample(format!("invalid value in feature '{}'", token))
            })?;
            (name, value)
        }
        None => (token, 1.0),
    };

    if name.is_empty() {
        return Err(LearnerError::MalformedExample(format!(
            "feature '{}' has no name",
            token
        )));
    }
    if !value.is_finite() {
        return Err(LearnerError::MalformedExample(format!(
            "feature '{}' has a non-finite value",
            token
        )));
    }

    Ok(Feature {
        name: name.to_string(),
        value,
    })
}

fn parse_label(head: &str) -> Result<Option<f32>, LearnerError> {
    let mut parts = head.split_whitespace();
    let raw = match parts.next() {
        Some(raw) => raw,
        None => return Ok(None),
    };
    if parts.next().is_some() {
        return Err(LearnerError::MalformedExample(format!(
            "unexpected tokens before the first namespace: '{}'",
            head.trim()
        )));
    }

    let label = raw
        .parse::<f32>()
        .map_err(|_| LearnerError::MalformedExample(format!("invalid label '{}'", raw)))?;
    if !label.is_finite() {
        return Err(LearnerError::MalformedExample(format!("invalid label '{}'", raw)));
    }
    Ok(Some(label))
}

impl FromStr for Example {
    type Err = LearnerError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end();
        let (head, body) = line.split_once('|').ok_or_else(|| {
            LearnerError::MalformedExample("missing '|' namespace separator".into())
        })?;

        let label = parse_label(head)?;

        let mut namespaces = Vec::new();
        for segment in body.split('|') {
            let (name, rest) = if segment.starts_with(char::is_whitespace) {
                ("", segment)
            } else {
                segment
                    .split_once(char::is_whitespace)
                    .unwrap_or((segment, ""))
            };

            let features = rest
                .split_whitespace()
                .map(parse_feature)
                .collect::<Result<Vec<_>, _>>()?;

            namespaces.push(Namespace {
                name: name.to_string(),
                features,
            });
        }

        Ok(Self { label, namespaces })
    }
}

impl fmt::Display for Example {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        if let Some(label) = self.label {
            write!(f, "{}", label)?;
            first = false;
        }

        for ns in &self.namespaces {
            if !first {
                write!(f, " ")?;
            }
            first = false;

            if ns.name.is_empty() {
                write!(f, "|")?;
            } else {
                write!(f, "|{}", ns.name)?;
            }
            for feature in &ns.features {
                if feature.value == 1.0 {
                    write!(f, " {}", feature.name)?;
                } else {
                    write!(f, " {}:{}", feature.name, feature.value)?;
                }
            }
        }
        Ok(())
    }
}
