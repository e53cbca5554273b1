//! One-line text records used to save and restore trees and hash tables.
//!
//! ```text
//! TREE <name> <count> <v1> ... <vN>
//! HASH <name> <count> <k1> <v1> ... <kN> <vN>
//! ```
//!
//! Tokens are separated by whitespace and are not escaped. Encoding refuses
//! names, keys and values that are empty or contain whitespace.

use std::str::FromStr;

use log::debug;

use crate::error::RecordError;
use crate::hash_table::HashTable;
use crate::tree::AvlTree;

const TREE_TAG: &str = "TREE";
const HASH_TAG: &str = "HASH";

/// The decoded contents of one saved structure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Record {
    /// Tree keys in the order they were saved.
    Tree { name: String, values: Vec<i64> },
    /// Key-value pairs in the order they were saved.
    Hash {
        name: String,
        pairs: Vec<(String, String)>,
    },
}

impl Record {
    pub fn name(&self) -> &str {
        match self {
            Record::Tree { name, .. } | Record::Hash { name, .. } => name,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Record::Tree { .. } => TREE_TAG,
            Record::Hash { .. } => HASH_TAG,
        }
    }

    /// Renders the record as one line without a trailing newline.
    pub fn encode(&self) -> Result<String, RecordError> {
        let mut line = String::new();
        match self {
            Record::Tree { name, values } => {
                line.push_str(&format!("{} {} {}", TREE_TAG, token(name)?, values.len()));
                for value in values {
                    line.push(' ');
                    line.push_str(&value.to_string());
                }
            }
            Record::Hash { name, pairs } => {
                line.push_str(&format!("{} {} {}", HASH_TAG, token(name)?, pairs.len()));
                for (key, value) in pairs {
                    line.push(' ');
                    line.push_str(token(key)?);
                    line.push(' ');
                    line.push_str(token(value)?);
                }
            }
        }
        Ok(line)
    }

    /// Rebuilds a tree by inserting every saved value.
    pub fn into_tree(self) -> Result<AvlTree, RecordError> {
        match self {
            Record::Tree { name, values } => {
                debug!("restoring tree '{}' from {} values", name, values.len());
                let mut tree = AvlTree::new(name);
                for value in values {
                    tree.insert(value);
                }
                Ok(tree)
            }
            other => Err(RecordError::KindMismatch {
                expected: TREE_TAG,
                actual: other.kind(),
            }),
        }
    }

    /// Rebuilds a hash table by inserting every saved pair.
    pub fn into_hash_table(self) -> Result<HashTable, RecordError> {
        match self {
            Record::Hash { name, pairs } => {
                debug!("restoring hash table '{}' from {} pairs", name, pairs.len());
                let mut table = HashTable::new(name);
                for (key, value) in pairs {
                    table.insert(key, value);
                }
                Ok(table)
            }
            other => Err(RecordError::KindMismatch {
                expected: HASH_TAG,
                actual: other.kind(),
            }),
        }
    }
}

impl From<&AvlTree> for Record {
    fn from(tree: &AvlTree) -> Self {
        Record::Tree {
            name: tree.name().to_owned(),
            values: tree.in_order_values(),
        }
    }
}

impl From<&HashTable> for Record {
    fn from(table: &HashTable) -> Self {
        Record::Hash {
            name: table.name().to_owned(),
            pairs: table
                .iter()
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
                .collect(),
        }
    }
}

/// Returns `value` if it survives a whitespace split as a single token.
fn token(value: &str) -> Result<&str, RecordError> {
    if value.is_empty() || value.contains(char::is_whitespace) {
        return Err(RecordError::InvalidToken(value.to_owned()));
    }
    Ok(value)
}

impl FromStr for Record {
    type Err = RecordError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let tag = tokens.next().ok_or(RecordError::Empty)?;
        let name = tokens.next().ok_or(RecordError::MissingField("name"))?;
        let count_token = tokens.next().ok_or(RecordError::MissingField("count"))?;
        let count: usize = count_token
            .parse()
            .map_err(|source| RecordError::InvalidCount {
                token: count_token.to_owned(),
                source,
            })?;

        let payload: Vec<&str> = tokens.collect();
        let expected = match tag {
            TREE_TAG => count,
            HASH_TAG => count.saturating_mul(2),
            _ => return Err(RecordError::UnknownKind(tag.to_owned())),
        };
        if payload.len() < expected {
            return Err(RecordError::Truncated {
                expected,
                actual: payload.len(),
            });
        }
        if payload.len() > expected {
            return Err(RecordError::TrailingTokens(payload.len() - expected));
        }

        let record = if tag == TREE_TAG {
            let values = payload
                .iter()
                .map(|token| {
                    token.parse().map_err(|source| RecordError::InvalidValue {
                        token: (*token).to_owned(),
                        source,
                    })
                })
                .collect::<Result<Vec<i64>, _>>()?;
            Record::Tree {
                name: name.to_owned(),
                values,
            }
        } else {
            let pairs = payload
                .chunks_exact(2)
                .map(|pair| (pair[0].to_owned(), pair[1].to_owned()))
                .collect();
            Record::Hash {
                name: name.to_owned(),
                pairs,
            }
        };
        debug!("decoded {} record '{}' with {} items", tag, name, count);
        Ok(record)
    }
}
