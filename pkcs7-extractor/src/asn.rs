//! Minimal DER reader.
//!
//! Parses a buffer into a tree of [`AsnNode`]s. Only definite lengths are
//! accepted; the reader has no notion of what the nodes mean.

use crate::error::ParseError;

pub const INTEGER: u32 = 0x02;
pub const OCTET_STRING: u32 = 0x04;
pub const OBJECT_IDENTIFIER: u32 = 0x06;
pub const SEQUENCE: u32 = 0x10;
pub const SET: u32 = 0x11;

const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagClass {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub class: TagClass,
    pub constructed: bool,
    pub number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Primitive(Vec<u8>),
    Constructed(Vec<AsnNode>),
}

/// One TLV element. `tag.constructed` always agrees with the `body` variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsnNode {
    tag: Tag,
    body: Body,
}

impl AsnNode {
    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn is_constructed(&self) -> bool {
        self.tag.constructed
    }

    /// Child nodes, or `None` for a primitive node.
    pub fn children(&self) -> Option<&[AsnNode]> {
        match &self.body {
            Body::Constructed(children) => Some(children),
            Body::Primitive(_) => None,
        }
    }

    /// Raw content octets, or `None` for a constructed node.
    pub fn value(&self) -> Option<&[u8]> {
        match &self.body {
            Body::Primitive(value) => Some(value),
            Body::Constructed(_) => None,
        }
    }

    pub fn child(&self, index: usize) -> Option<&AsnNode> {
        self.children().and_then(|children| children.get(index))
    }

    pub fn is_universal(&self, number: u32) -> bool {
        self.tag.class == TagClass::Universal && self.tag.number == number
    }

    pub fn is_context(&self, number: u32) -> bool {
        self.tag.class == TagClass::ContextSpecific && self.tag.number == number
    }
}

/// Parse `bytes` as exactly one DER element.
pub fn parse(bytes: &[u8]) -> Result<AsnNode, ParseError> {
    let (node, consumed) = parse_prefix(bytes)?;
    if consumed != bytes.len() {
        return Err(ParseError::TrailingData { offset: consumed });
    }
    Ok(node)
}

/// Parse the first DER element of `bytes`, returning it with the number of
/// bytes it occupies.
pub fn parse_prefix(bytes: &[u8]) -> Result<(AsnNode, usize), ParseError> {
    let mut reader = Reader::new(bytes, 0, bytes.len());
    let node = reader.read_node(0)?;
    Ok((node, reader.position))
}

struct Reader<'a> {
    buffer: &'a [u8],
    position: usize,
    end: usize,
}

impl<'a> Reader<'a> {
    fn new(buffer: &'a [u8], position: usize, end: usize) -> Self {
        Self {
            buffer,
            position,
            end,
        }
    }

    fn read_byte(&mut self) -> Result<u8, ParseError> {
        if self.position >= self.end {
            return Err(ParseError::UnexpectedEof {
                offset: self.position,
            });
        }
        let byte = self.buffer[self.position];
        self.position += 1;
        Ok(byte)
    }

    fn read_tag(&mut self) -> Result<Tag, ParseError> {
        let offset = self.position;
        let b0 = self.read_byte()?;

        let class = match b0 >> 6 {
            0 => TagClass::Universal,
            1 => TagClass::Application,
            2 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        };
        let constructed = b0 & 0x20 != 0;
        let mut number = u32::from(b0 & 0x1F);

        if number == 0x1F {
            // High-tag-number form, base-128 with continuation bit.
            number = 0;
            loop {
                let b = self.read_byte()?;
                if number > u32::MAX >> 7 {
                    return Err(ParseError::TagNumberOverflow { offset });
                }
                number = (number << 7) | u32::from(b & 0x7F);
                if b & 0x80 == 0 {
                    break;
                }
            }
        }

        Ok(Tag {
            class,
            constructed,
            number,
        })
    }

    fn read_length(&mut self) -> Result<usize, ParseError> {
        let offset = self.position;
        let b0 = self.read_byte()?;
        if b0 < 0x80 {
            return Ok(usize::from(b0));
        }

        // 0x80 is the BER indefinite form, 0xFF is reserved.
        let count = usize::from(b0 & 0x7F);
        if count == 0 || b0 == 0xFF || count > 8 {
            return Err(ParseError::UnsupportedLength { offset });
        }

        let mut len: usize = 0;
        for _ in 0..count {
            let b = self.read_byte()?;
            len = len
                .checked_mul(256)
                .map(|l| l | usize::from(b))
                .ok_or(ParseError::UnsupportedLength { offset })?;
        }
        Ok(len)
    }

    fn read_node(&mut self, depth: usize) -> Result<AsnNode, ParseError> {
        let offset = self.position;
        if depth > MAX_DEPTH {
            return Err(ParseError::TooDeep { offset });
        }

        let tag = self.read_tag()?;
        let len = self.read_length()?;

        let start = self.position;
        let available = self.end - start;
        if len > available {
            return Err(ParseError::LengthOverrun {
                offset,
                declared: len,
                available,
            });
        }
        let end = start + len;

        let body = if tag.constructed {
            let mut inner = Reader::new(self.buffer, start, end);
            let mut children = Vec::new();
            while inner.position < end {
                children.push(inner.read_node(depth + 1)?);
            }
            Body::Constructed(children)
        } else {
            Body::Primitive(self.buffer[start..end].to_vec())
        };

        self.position = end;
        Ok(AsnNode { tag, body })
    }
}
