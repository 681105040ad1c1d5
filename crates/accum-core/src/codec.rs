//! Line-oriented text persistence for paths, trees and bundles.
//!
//! Digests are 64 lowercase hex characters, and a digest vector is its length
//! on one line followed by one digest per line:
//!
//! ```text
//! AuthPath:  <depth> <root_path vector> <siblings vector> <child bits, one 0|1 per line>
//! Tree:      <is_full 0|1> <AuthPath>
//! Bundle:    <Tree> <tree_size> <auth_leaf vector> <one AuthPath per retained leaf>
//! ```
//!
//! Decoding builds a fresh value or fails; nothing is ever partially restored.

use std::fmt;
use std::str::{FromStr, SplitAsciiWhitespace};

use crate::auth_path::AuthPath;
use crate::bundle::Bundle;
use crate::error::CodecError;
use crate::node::{MAX_TREE_DEPTH, NODE_SIZE, Node};
use crate::tree::Tree;

/// A value with a text persistence format.
pub trait TextCodec: Sized {
    /// Write the text form of `self` to `out`.
    ///
    /// # Errors
    /// Returns an error if `out` rejects the write.
    fn write_text<W: fmt::Write>(&self, out: &mut W) -> fmt::Result;

    /// Read one value from `tokens`, leaving any following tokens unread.
    ///
    /// # Errors
    /// Returns a [`CodecError`] describing the first malformed or missing field.
    fn read_text(tokens: &mut Tokens<'_>) -> Result<Self, CodecError>;

    /// The text form of `self`.
    #[must_use]
    fn encode(&self) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        self.write_text(&mut out).ok();
        out
    }

    /// Parse a complete text form, rejecting trailing tokens.
    ///
    /// # Errors
    /// Returns a [`CodecError`] if the text is malformed, truncated or
    /// inconsistent, or if tokens remain after the value.
    fn decode(text: &str) -> Result<Self, CodecError> {
        let mut tokens = Tokens::new(text);
        let value = Self::read_text(&mut tokens)?;
        tokens.finish()?;
        Ok(value)
    }
}

/// Whitespace-separated token reader.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    inner: SplitAsciiWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    /// Tokenize `text`.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_ascii_whitespace(),
        }
    }

    /// Fail if any token is left.
    ///
    /// # Errors
    /// Returns [`CodecError::TrailingData`] with the first leftover token.
    pub fn finish(mut self) -> Result<(), CodecError> {
        match self.inner.next() {
            Some(token) => Err(CodecError::TrailingData(token.to_owned())),
            None => Ok(()),
        }
    }

    fn token(&mut self, field: &'static str) -> Result<&'a str, CodecError> {
        self.inner.next().ok_or(CodecError::UnexpectedEnd(field))
    }

    fn number<T: FromStr>(&mut self, field: &'static str) -> Result<T, CodecError> {
        let token = self.token(field)?;
        token.parse().map_err(|_| CodecError::InvalidNumber {
            field,
            token: token.to_owned(),
        })
    }

    fn digest<N: Node>(&mut self, field: &'static str) -> Result<N, CodecError> {
        let token = self.token(field)?;
        let mut bytes = [0u8; NODE_SIZE];
        hex::decode_to_slice(token, &mut bytes)
            .ok()
            .and_then(|()| N::from_bytes(bytes))
            .ok_or_else(|| CodecError::InvalidDigest(token.to_owned()))
    }

    /// A digest vector whose declared length must be `depth`.
    fn digests<N: Node>(
        &mut self,
        field: &'static str,
        depth: usize,
    ) -> Result<Vec<N>, CodecError> {
        let found: usize = self.number(field)?;
        if found != depth {
            return Err(CodecError::LengthMismatch {
                field,
                expected: depth,
                found,
            });
        }
        (0..depth).map(|_| self.digest(field)).collect()
    }

    fn bit(&mut self) -> Result<bool, CodecError> {
        match self.token("child_bits")? {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(CodecError::InvalidBit(other.to_owned())),
        }
    }

    fn flag(&mut self) -> Result<bool, CodecError> {
        match self.token("is_full")? {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(CodecError::InvalidFlag(other.to_owned())),
        }
    }
}

fn write_digests<N: Node, W: fmt::Write>(out: &mut W, digests: &[N]) -> fmt::Result {
    writeln!(out, "{}", digests.len())?;
    for digest in digests {
        writeln!(out, "{}", hex::encode(digest.to_bytes()))?;
    }
    Ok(())
}

impl<N: Node> TextCodec for AuthPath<N> {
    fn write_text<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "{}", self.depth())?;
        write_digests(out, self.root_path())?;
        write_digests(out, self.siblings())?;
        for &bit in self.child_bits() {
            writeln!(out, "{}", u8::from(bit))?;
        }
        Ok(())
    }

    fn read_text(tokens: &mut Tokens<'_>) -> Result<Self, CodecError> {
        let depth: usize = tokens.number("depth")?;
        if depth == 0 {
            return Err(CodecError::ZeroDepth);
        }
        if depth > usize::from(MAX_TREE_DEPTH) {
            return Err(CodecError::DepthTooLarge {
                depth,
                max: MAX_TREE_DEPTH,
            });
        }

        let root_path = tokens.digests("root_path", depth)?;
        let siblings = tokens.digests("siblings", depth)?;
        let child_bits = (0..depth)
            .map(|_| tokens.bit())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_vectors(root_path, siblings, child_bits))
    }
}

impl<N: Node> TextCodec for Tree<N> {
    fn write_text<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "{}", u8::from(self.is_full()))?;
        self.auth_path().write_text(out)
    }

    fn read_text(tokens: &mut Tokens<'_>) -> Result<Self, CodecError> {
        let is_full = tokens.flag()?;
        let auth_path = AuthPath::read_text(tokens)?;

        // a full tree has wrapped its counter back to zero
        let position = auth_path.position();
        if is_full && position != 0 {
            return Err(CodecError::FullTreeFrontier { position });
        }
        Ok(Self::from_decoded(is_full, auth_path))
    }
}

impl<N: Node> TextCodec for Bundle<N> {
    fn write_text<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        self.tree().write_text(out)?;
        writeln!(out, "{}", self.tree_size())?;
        write_digests(out, self.auth_leaf())?;
        for path in self.auth_path() {
            path.write_text(out)?;
        }
        Ok(())
    }

    fn read_text(tokens: &mut Tokens<'_>) -> Result<Self, CodecError> {
        let tree = Tree::read_text(tokens)?;
        let tree_size: u64 = tokens.number("tree_size")?;

        let consistent = if tree.is_full() {
            tree_size == tree.capacity()
        } else {
            tree_size == tree.auth_path().position()
        };
        if !consistent {
            return Err(CodecError::InconsistentSize { tree_size });
        }

        let retained: u64 = tokens.number("auth_leaf")?;
        if retained > tree_size {
            return Err(CodecError::InconsistentSize { tree_size });
        }
        let mut auth_leaf = Vec::new();
        for _ in 0..retained {
            auth_leaf.push(tokens.digest("auth_leaf")?);
        }

        let mut auth_path = Vec::with_capacity(auth_leaf.len());
        for _ in 0..auth_leaf.len() {
            let path = AuthPath::read_text(tokens)?;
            if path.depth() != tree.depth() {
                return Err(CodecError::DepthMismatch {
                    expected: tree.depth(),
                    found: path.depth(),
                });
            }
            auth_path.push(path);
        }

        Ok(Self::from_decoded(tree, tree_size, auth_leaf, auth_path))
    }
}

macro_rules! text_codec_traits {
    ($($ty:ident),+) => {
        $(
            impl<N: Node> fmt::Display for $ty<N> {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.write_text(f)
                }
            }

            impl<N: Node> FromStr for $ty<N> {
                type Err = CodecError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::decode(s)
                }
            }
        )+
    };
}

text_codec_traits!(AuthPath, Tree, Bundle);
