//! Hessian 1 wire codec: calls, replies, faults, and the value grammar.
//!
//! Frame grammar (version 1.0):
//!
//! ```text
//! call  ::= 'c' 0x01 0x00 header* 'm' u16 <method> value* 'z'
//! reply ::= 'r' 0x01 0x00 header* (value | fault) 'z'
//! fault ::= 'f' (string value)* 'z'
//! ```
//!
//! Value tags: `N` null, `T`/`F` boolean, `I` int32, `L` int64, `D` double,
//! `d` date (epoch millis), `s`/`S` string chunks, `x`/`X` xml chunks,
//! `b`/`B` binary chunks, `V` list, `M` map, `R` back-reference. String and
//! xml chunk lengths count UTF-8 *characters*, not bytes; binary chunk
//! lengths count bytes. Chunks are capped at 0xFFFF units, the lowercase tag
//! marking a non-final chunk.
//!
//! Parsing is restartable: every decode path reports
//! [`ParseError::Incomplete`] when it runs off the end of the buffer, so a
//! caller can read more bytes and retry. The raw TCP transport has no
//! framing of its own and relies on this to find the end of a request.

use crate::value::{Fault, Value};

/// Maximum units (characters or bytes) per string/binary chunk.
const CHUNK_MAX: usize = 0xFFFF;

/// One decoded RPC call.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: String,
    pub headers: Vec<(String, Value)>,
    pub args: Vec<Value>,
}

/// One decoded RPC reply: either a result value or a fault.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Value(Value),
    Fault(Fault),
}

/// Codec decoding errors
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// More bytes are required before a complete frame can be decoded
    Incomplete,
    /// An unknown or out-of-place tag byte
    UnexpectedTag(u8),
    /// Version bytes other than 1.0
    UnsupportedVersion(u8, u8),
    /// A string chunk did not hold valid UTF-8
    InvalidUtf8,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Incomplete => write!(f, "incomplete frame"),
            ParseError::UnexpectedTag(tag) => write!(f, "unexpected tag 0x{tag:02x}"),
            ParseError::UnsupportedVersion(major, minor) => {
                write!(f, "unsupported protocol version {major}.{minor}")
            }
            ParseError::InvalidUtf8 => write!(f, "invalid UTF-8 in string chunk"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Decode one call from the front of `buffer`.
///
/// Returns the call and the number of bytes consumed, or
/// [`ParseError::Incomplete`] if the buffer does not yet hold a full frame.
pub fn parse_call(buffer: &[u8]) -> Result<(Call, usize), ParseError> {
    let mut d = Decoder::new(buffer);
    d.expect(b'c')?;
    d.version()?;
    let headers = d.read_headers()?;
    d.expect(b'm')?;
    let method = d.read_short_string()?;
    let mut args = Vec::new();
    while d.peek()? != b'z' {
        args.push(d.read_value()?);
    }
    d.take()?;
    Ok((
        Call {
            method,
            headers,
            args,
        },
        d.pos,
    ))
}

/// Decode one reply from the front of `buffer`.
pub fn parse_reply(buffer: &[u8]) -> Result<(Reply, usize), ParseError> {
    let mut d = Decoder::new(buffer);
    d.expect(b'r')?;
    d.version()?;
    let _headers = d.read_headers()?;
    let reply = if d.peek()? == b'f' {
        d.take()?;
        Reply::Fault(d.read_fault()?)
    } else {
        Reply::Value(d.read_value()?)
    };
    d.expect(b'z')?;
    Ok((reply, d.pos))
}

/// Encode a call frame. Used by conformance clients and the test suite.
pub fn encode_call(method: &str, args: &[Value]) -> Vec<u8> {
    let mut out = vec![b'c', 1, 0];
    write_tagged_string(&mut out, b'm', method);
    for arg in args {
        write_value(&mut out, arg);
    }
    out.push(b'z');
    out
}

/// Encode a successful reply carrying `value`.
pub fn encode_reply(value: &Value) -> Vec<u8> {
    let mut out = vec![b'r', 1, 0];
    write_value(&mut out, value);
    out.push(b'z');
    out
}

/// Encode a fault reply.
pub fn encode_fault(fault: &Fault) -> Vec<u8> {
    let mut out = vec![b'r', 1, 0, b'f'];
    write_text(&mut out, b's', b'S', "code");
    write_text(&mut out, b's', b'S', &fault.code);
    write_text(&mut out, b's', b'S', "message");
    write_text(&mut out, b's', b'S', &fault.message);
    write_text(&mut out, b's', b'S', "detail");
    write_value(&mut out, &fault.detail);
    out.push(b'z');
    out.push(b'z');
    out
}

/// Restartable cursor over an input buffer. Running off the end yields
/// [`ParseError::Incomplete`], never a panic.
struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Decoder { buf, pos: 0 }
    }

    fn take(&mut self) -> Result<u8, ParseError> {
        let b = self.peek()?;
        self.pos += 1;
        Ok(b)
    }

    fn peek(&self) -> Result<u8, ParseError> {
        self.buf.get(self.pos).copied().ok_or(ParseError::Incomplete)
    }

    fn take_slice(&mut self, n: usize) -> Result<&'a [u8], ParseError> {
        if self.buf.len() - self.pos < n {
            return Err(ParseError::Incomplete);
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn expect(&mut self, tag: u8) -> Result<(), ParseError> {
        let b = self.take()?;
        if b != tag {
            return Err(ParseError::UnexpectedTag(b));
        }
        Ok(())
    }

    fn version(&mut self) -> Result<(), ParseError> {
        let major = self.take()?;
        let minor = self.take()?;
        if major != 1 || minor != 0 {
            return Err(ParseError::UnsupportedVersion(major, minor));
        }
        Ok(())
    }

    fn read_u16(&mut self) -> Result<u16, ParseError> {
        let b = self.take_slice(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn read_i32(&mut self) -> Result<i32, ParseError> {
        let b = self.take_slice(4)?;
        Ok(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_i64(&mut self) -> Result<i64, ParseError> {
        let b = self.take_slice(8)?;
        Ok(i64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Read `count` UTF-8 encoded characters.
    fn read_chars(&mut self, count: usize) -> Result<String, ParseError> {
        let start = self.pos;
        for _ in 0..count {
            let lead = self.take()?;
            let extra = match lead {
                0x00..=0x7f => 0,
                0xc0..=0xdf => 1,
                0xe0..=0xef => 2,
                0xf0..=0xf4 => 3,
                _ => return Err(ParseError::InvalidUtf8),
            };
            self.take_slice(extra)?;
        }
        std::str::from_utf8(&self.buf[start..self.pos])
            .map(str::to_owned)
            .map_err(|_| ParseError::InvalidUtf8)
    }

    /// Single-chunk string whose tag has already been consumed. Used for
    /// method names, header names, and type names.
    fn read_short_string(&mut self) -> Result<String, ParseError> {
        let len = self.read_u16()? as usize;
        self.read_chars(len)
    }

    /// Chunked text: zero or more `initial` chunks followed by one
    /// `terminal` chunk. `first` is the already-consumed tag of the first
    /// chunk.
    fn read_chunked_text(
        &mut self,
        initial: u8,
        terminal: u8,
        first: u8,
    ) -> Result<String, ParseError> {
        let mut tag = first;
        let mut out = String::new();
        loop {
            let len = self.read_u16()? as usize;
            out.push_str(&self.read_chars(len)?);
            if tag == terminal {
                return Ok(out);
            }
            tag = self.take()?;
            if tag != initial && tag != terminal {
                return Err(ParseError::UnexpectedTag(tag));
            }
        }
    }

    /// Chunked binary, `b`/`B` tags with byte lengths.
    fn read_binary(&mut self, first: u8) -> Result<Vec<u8>, ParseError> {
        let mut tag = first;
        let mut out = Vec::new();
        loop {
            let len = self.read_u16()? as usize;
            out.extend_from_slice(self.take_slice(len)?);
            if tag == b'B' {
                return Ok(out);
            }
            tag = self.take()?;
            if tag != b'b' && tag != b'B' {
                return Err(ParseError::UnexpectedTag(tag));
            }
        }
    }

    fn read_headers(&mut self) -> Result<Vec<(String, Value)>, ParseError> {
        let mut headers = Vec::new();
        while self.peek()? == b'H' {
            self.take()?;
            let name = self.read_short_string()?;
            let value = self.read_value()?;
            headers.push((name, value));
        }
        Ok(headers)
    }

    fn read_value(&mut self) -> Result<Value, ParseError> {
        let tag = self.take()?;
        match tag {
            b'N' => Ok(Value::Null),
            b'T' => Ok(Value::Bool(true)),
            b'F' => Ok(Value::Bool(false)),
            b'I' => Ok(Value::Int(self.read_i32()?)),
            b'L' => Ok(Value::Long(self.read_i64()?)),
            b'D' => Ok(Value::Double(f64::from_bits(self.read_i64()? as u64))),
            b'd' => Ok(Value::Date(self.read_i64()?)),
            b's' | b'S' => Ok(Value::String(self.read_chunked_text(b's', b'S', tag)?)),
            b'x' | b'X' => Ok(Value::Xml(self.read_chunked_text(b'x', b'X', tag)?)),
            b'b' | b'B' => Ok(Value::Bytes(self.read_binary(tag)?)),
            b'V' => self.read_list(),
            b'M' => self.read_map(),
            b'R' => Ok(Value::Ref(self.read_i32()? as u32)),
            other => Err(ParseError::UnexpectedTag(other)),
        }
    }

    fn read_list(&mut self) -> Result<Value, ParseError> {
        let mut type_name = None;
        if self.peek()? == b't' {
            self.take()?;
            type_name = Some(self.read_short_string()?);
        }
        // The declared length is advisory; elements run until 'z'.
        if self.peek()? == b'l' {
            self.take()?;
            self.read_i32()?;
        }
        let mut items = Vec::new();
        while self.peek()? != b'z' {
            items.push(self.read_value()?);
        }
        self.take()?;
        Ok(Value::List { type_name, items })
    }

    fn read_map(&mut self) -> Result<Value, ParseError> {
        let mut type_name = None;
        if self.peek()? == b't' {
            self.take()?;
            type_name = Some(self.read_short_string()?);
        }
        let mut entries = Vec::new();
        while self.peek()? != b'z' {
            let key = self.read_value()?;
            let value = self.read_value()?;
            entries.push((key, value));
        }
        self.take()?;
        Ok(Value::Map { type_name, entries })
    }

    /// Fault body after the 'f' tag: string-keyed fields up to 'z'.
    fn read_fault(&mut self) -> Result<Fault, ParseError> {
        let mut code = String::new();
        let mut message = String::new();
        let mut detail = Value::Null;
        while self.peek()? != b'z' {
            let tag = self.take()?;
            let key = match tag {
                b's' | b'S' => self.read_chunked_text(b's', b'S', tag)?,
                other => return Err(ParseError::UnexpectedTag(other)),
            };
            let value = self.read_value()?;
            match (key.as_str(), value) {
                ("code", Value::String(s)) => code = s,
                ("message", Value::String(s)) => message = s,
                ("detail", v) => detail = v,
                _ => {}
            }
        }
        self.take()?;
        Ok(Fault {
            code,
            message,
            detail,
        })
    }
}

fn write_value(out: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => out.push(b'N'),
        Value::Bool(true) => out.push(b'T'),
        Value::Bool(false) => out.push(b'F'),
        Value::Int(v) => {
            out.push(b'I');
            out.extend_from_slice(&v.to_be_bytes());
        }
        Value::Long(v) => {
            out.push(b'L');
            out.extend_from_slice(&v.to_be_bytes());
        }
        Value::Double(v) => {
            out.push(b'D');
            out.extend_from_slice(&v.to_bits().to_be_bytes());
        }
        Value::Date(millis) => {
            out.push(b'd');
            out.extend_from_slice(&millis.to_be_bytes());
        }
        Value::String(s) => write_text(out, b's', b'S', s),
        Value::Xml(s) => write_text(out, b'x', b'X', s),
        Value::Bytes(data) => write_binary(out, data),
        Value::List { type_name, items } => {
            out.push(b'V');
            if let Some(t) = type_name {
                write_tagged_string(out, b't', t);
            }
            out.push(b'l');
            out.extend_from_slice(&(items.len() as i32).to_be_bytes());
            for item in items {
                write_value(out, item);
            }
            out.push(b'z');
        }
        Value::Map { type_name, entries } => {
            out.push(b'M');
            if let Some(t) = type_name {
                write_tagged_string(out, b't', t);
            }
            for (key, val) in entries {
                write_value(out, key);
                write_value(out, val);
            }
            out.push(b'z');
        }
        Value::Ref(idx) => {
            out.push(b'R');
            out.extend_from_slice(&(*idx as i32).to_be_bytes());
        }
    }
}

/// Single-chunk string for method, header, and type names. These are always
/// short; the chunk limit is not a concern here.
fn write_tagged_string(out: &mut Vec<u8>, tag: u8, value: &str) {
    out.push(tag);
    out.extend_from_slice(&(value.chars().count() as u16).to_be_bytes());
    out.extend_from_slice(value.as_bytes());
}

/// Chunked text. Full chunks carry `initial`, the final chunk `terminal`;
/// chunk lengths count characters and every split lands on a char boundary.
fn write_text(out: &mut Vec<u8>, initial: u8, terminal: u8, value: &str) {
    let mut remaining = value.chars().count();
    let mut offset = 0;
    while remaining > CHUNK_MAX {
        let end = value[offset..]
            .char_indices()
            .nth(CHUNK_MAX)
            .map(|(i, _)| offset + i)
            .unwrap_or(value.len());
        out.push(initial);
        out.extend_from_slice(&(CHUNK_MAX as u16).to_be_bytes());
        out.extend_from_slice(&value.as_bytes()[offset..end]);
        offset = end;
        remaining -= CHUNK_MAX;
    }
    out.push(terminal);
    out.extend_from_slice(&(remaining as u16).to_be_bytes());
    out.extend_from_slice(&value.as_bytes()[offset..]);
}

fn write_binary(out: &mut Vec<u8>, data: &[u8]) {
    let mut rest = data;
    while rest.len() > CHUNK_MAX {
        out.push(b'b');
        out.extend_from_slice(&(CHUNK_MAX as u16).to_be_bytes());
        out.extend_from_slice(&rest[..CHUNK_MAX]);
        rest = &rest[CHUNK_MAX..];
    }
    out.push(b'B');
    out.extend_from_slice(&(rest.len() as u16).to_be_bytes());
    out.extend_from_slice(rest);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_no_arg_call() {
        let buffer = b"c\x01\x00m\x00\x08nullCallz";
        let (call, consumed) = parse_call(buffer).unwrap();
        assert_eq!(call.method, "nullCall");
        assert!(call.headers.is_empty());
        assert!(call.args.is_empty());
        assert_eq!(consumed, buffer.len());
    }

    #[test]
    fn test_parse_call_with_args() {
        let bytes = encode_call("subtract", &[Value::Int(50), Value::Int(3)]);
        let (call, consumed) = parse_call(&bytes).unwrap();
        assert_eq!(call.method, "subtract");
        assert_eq!(call.args, vec![Value::Int(50), Value::Int(3)]);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn test_truncated_call_is_incomplete() {
        let buffer = b"c\x01\x00m\x00\x08nullCallz";
        for end in 0..buffer.len() {
            assert_eq!(
                parse_call(&buffer[..end]).unwrap_err(),
                ParseError::Incomplete,
                "prefix of {end} bytes should be incomplete"
            );
        }
    }

    #[test]
    fn test_null_reply_canonical_bytes() {
        assert_eq!(encode_reply(&Value::Null), b"r\x01\x00Nz");
    }

    #[test]
    fn test_reply_roundtrip() {
        for value in [
            Value::Bool(true),
            Value::Int(-0x801),
            Value::Long(0x80000000),
            Value::Double(3.14159),
            Value::Date(894_621_091_000),
            Value::string("Hello, World"),
            Value::Bytes(b"0123456789012345".to_vec()),
            Value::typed_list("[string", vec![Value::string("1"), Value::string("2")]),
            Value::typed_map(
                "java.util.Hashtable",
                vec![(Value::string("a"), Value::Int(0))],
            ),
            Value::list(vec![Value::map(vec![]), Value::Ref(1)]),
        ] {
            let bytes = encode_reply(&value);
            let (reply, consumed) = parse_reply(&bytes).unwrap();
            assert_eq!(reply, Reply::Value(value));
            assert_eq!(consumed, bytes.len());
        }
    }

    #[test]
    fn test_fault_roundtrip() {
        let fault = Fault::new(
            "ServiceException",
            "sample exception",
            Value::typed_map(
                "java.lang.NullPointerException",
                vec![
                    (
                        Value::string("detailMessage"),
                        Value::string("sample exception"),
                    ),
                    (Value::string("cause"), Value::Ref(0)),
                ],
            ),
        );
        let bytes = encode_fault(&fault);
        let (reply, _) = parse_reply(&bytes).unwrap();
        assert_eq!(reply, Reply::Fault(fault));
    }

    #[test]
    fn test_long_string_chunking() {
        // 70000 chars forces one 0xFFFF-char 's' chunk plus a final 'S'.
        let value = Value::String("x".repeat(70_000));
        let bytes = encode_reply(&value);
        assert_eq!(bytes[3], b's');
        let (reply, _) = parse_reply(&bytes).unwrap();
        assert_eq!(reply, Reply::Value(value));
    }

    #[test]
    fn test_string_length_counts_chars_not_bytes() {
        let value = Value::string("héllo");
        let bytes = encode_reply(&value);
        // tag, then char count 5 even though 6 bytes of UTF-8 follow
        assert_eq!(&bytes[3..6], b"S\x00\x05");
        let (reply, _) = parse_reply(&bytes).unwrap();
        assert_eq!(reply, Reply::Value(value));
    }

    #[test]
    fn test_call_with_header() {
        let buffer = b"c\x01\x00H\x00\x04testTm\x00\x04echoz";
        let (call, _) = parse_call(buffer).unwrap();
        assert_eq!(call.headers, vec![("test".to_string(), Value::Bool(true))]);
        assert_eq!(call.method, "echo");
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert_eq!(
            parse_call(b"\xff\xff\xff\xff"),
            Err(ParseError::UnexpectedTag(0xff))
        );
        assert_eq!(
            parse_call(b"c\x02\x00m\x00\x01az"),
            Err(ParseError::UnsupportedVersion(2, 0))
        );
    }

    #[test]
    fn test_list_declared_length_is_advisory() {
        // 'V' 'l' <wrong declared length> element 'z'
        let mut bytes = vec![
            b'r', 1, 0, b'V', b'l', 0, 0, 0, 9, b'I', 0, 0, 0, 1, b'z', b'z',
        ];
        let (reply, _) = parse_reply(&bytes).unwrap();
        assert_eq!(reply, Reply::Value(Value::list(vec![Value::Int(1)])));
        bytes.truncate(6);
        assert_eq!(parse_reply(&bytes).unwrap_err(), ParseError::Incomplete);
    }
}
