//! Decoding of EC2 query-protocol parameters.
//!
//! EC2 requests are flat `key=value` maps carried in the query string (GET)
//! or an `application/x-www-form-urlencoded` body (POST). Lists are encoded as
//! `Name.1=a&Name.2=b`.

use std::collections::BTreeMap;

use crate::error::Ec2Error;

/// Decoded request parameters in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ec2Params {
    pairs: Vec<(String, String)>,
}

impl Ec2Params {
    /// Decode a form-urlencoded string.
    ///
    /// # Examples
    ///
    /// ```
    /// use tritonshim_ec2_model::Ec2Params;
    ///
    /// let params = Ec2Params::parse("Action=DescribeImages&Owner.1=self");
    /// assert_eq!(params.action(), Some("DescribeImages"));
    /// ```
    #[must_use]
    pub fn parse(encoded: &str) -> Self {
        Self::from_pairs(form_urlencoded::parse(encoded.as_bytes()).into_owned())
    }

    /// Build from already decoded pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            pairs: pairs.into_iter().collect(),
        }
    }

    /// Append the pairs of `other` after this set's pairs.
    pub fn extend(&mut self, other: Self) {
        self.pairs.extend(other.pairs);
    }

    /// First value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The `Action` parameter, if present and non-empty.
    #[must_use]
    pub fn action(&self) -> Option<&str> {
        self.get("Action").filter(|a| !a.is_empty())
    }

    /// Collect the `prefix.N` list, ordered by `N`.
    ///
    /// # Errors
    ///
    /// `InvalidParameterValue` when an index is not a positive decimal
    /// integer or appears twice.
    pub fn list(&self, prefix: &str) -> Result<Vec<String>, Ec2Error> {
        let mut items: BTreeMap<u32, &str> = BTreeMap::new();
        for (key, value) in &self.pairs {
            let Some(index) = key
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('.'))
            else {
                continue;
            };
            let position = Some(index)
                .filter(|i| !i.is_empty() && i.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|i| i.parse::<u32>().ok())
                .filter(|i| *i > 0)
                .ok_or_else(|| {
                    Ec2Error::invalid_parameter_value(format!(
                        "Invalid list index in parameter {key}"
                    ))
                })?;
            if items.insert(position, value).is_some() {
                return Err(Ec2Error::invalid_parameter_value(format!(
                    "Parameter {key} is specified more than once"
                )));
            }
        }
        Ok(items.into_values().map(str::to_owned).collect())
    }

    /// Whether no parameters were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Types that can be decoded from request parameters.
pub trait FromParams: Sized {
    /// Decode `Self` from `params`.
    ///
    /// # Errors
    ///
    /// Returns a protocol error describing the offending parameter.
    fn from_params(params: &Ec2Params) -> Result<Self, Ec2Error>;
}
