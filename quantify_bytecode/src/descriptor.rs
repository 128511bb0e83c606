//! Method-descriptor parsing.
//!
//! Descriptors use the JVM class-file grammar: `( ParameterDescriptor* )
//! ReturnDescriptor`, where a field type is a base type (`B C D F I J S Z`),
//! an object type (`L<internal name>;`), or an array type (`[` prefixes).

use thiserror::Error;

/// Failure to parse a method descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// The descriptor did not start with `(`.
    #[error("method descriptor must start with '(': {0:?}")]
    MissingOpenParen(String),
    /// The descriptor ended before the grammar was satisfied.
    #[error("method descriptor ended unexpectedly: {0:?}")]
    UnexpectedEnd(String),
    /// A character that is not a valid type prefix.
    #[error("invalid type character {ch:?} at byte {pos} in {descriptor:?}")]
    InvalidType {
        /// Offending character.
        ch: char,
        /// Byte offset in the descriptor.
        pos: usize,
        /// The full descriptor text.
        descriptor: String,
    },
    /// An object type missing its `;` terminator.
    #[error("unterminated object type at byte {pos} in {descriptor:?}")]
    UnterminatedObject {
        /// Byte offset where the object type started.
        pos: usize,
        /// The full descriptor text.
        descriptor: String,
    },
}

/// A parsed method descriptor: parameter descriptors in declared order plus
/// the return descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// Parameter type descriptors, in declared order.
    pub params: Vec<String>,
    /// Return type descriptor (`V` for void).
    pub ret: String,
}

impl MethodDescriptor {
    /// Number of local slots the parameters occupy (wide types count twice).
    pub fn param_slots(&self) -> u16 {
        self.params
            .iter()
            .map(|p| if is_wide(p) { 2 } else { 1 })
            .sum()
    }
}

/// Whether a field descriptor names a two-slot (wide) type.
#[inline]
pub fn is_wide(descriptor: &str) -> bool {
    matches!(descriptor, "J" | "D")
}

/// Parse a method descriptor such as `(ILjava/lang/String;)J`.
pub fn parse_method_descriptor(desc: &str) -> Result<MethodDescriptor, DescriptorError> {
    let mut cursor = Cursor::new(desc);

    if !cursor.eat('(') {
        return Err(DescriptorError::MissingOpenParen(desc.to_string()));
    }

    let mut params = Vec::new();
    loop {
        match cursor.first() {
            Some(')') => {
                cursor.bump();
                break;
            }
            Some(_) => params.push(cursor.field_type()?),
            None => return Err(DescriptorError::UnexpectedEnd(desc.to_string())),
        }
    }

    let ret = match cursor.first() {
        Some('V') => {
            cursor.bump();
            "V".to_string()
        }
        Some(_) => cursor.field_type()?,
        None => return Err(DescriptorError::UnexpectedEnd(desc.to_string())),
    };

    Ok(MethodDescriptor { params, ret })
}

/// Character cursor over a descriptor with single-character lookahead.
struct Cursor<'src> {
    source: &'src str,
    pos: usize,
}

impl<'src> Cursor<'src> {
    fn new(source: &'src str) -> Self {
        Self { source, pos: 0 }
    }

    /// Peek at the next character without consuming it.
    fn first(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    /// Consume and return the next character.
    fn bump(&mut self) -> Option<char> {
        let c = self.first()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consume a specific character if it matches.
    fn eat(&mut self, c: char) -> bool {
        if self.first() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume one field type and return its descriptor text.
    fn field_type(&mut self) -> Result<String, DescriptorError> {
        let start = self.pos;
        // Array types: any run of '[' prefixes applies to the element type.
        while self.eat('[') {}

        match self.bump() {
            Some('B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z') => {}
            Some('L') => {
                let obj_start = start;
                loop {
                    match self.bump() {
                        Some(';') => break,
                        Some(_) => {}
                        None => {
                            return Err(DescriptorError::UnterminatedObject {
                                pos: obj_start,
                                descriptor: self.source.to_string(),
                            });
                        }
                    }
                }
            }
            Some(ch) => {
                return Err(DescriptorError::InvalidType {
                    ch,
                    pos: self.pos - ch.len_utf8(),
                    descriptor: self.source.to_string(),
                });
            }
            None => return Err(DescriptorError::UnexpectedEnd(self.source.to_string())),
        }

        Ok(self.source[start..self.pos].to_string())
    }
}
