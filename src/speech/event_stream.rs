//! AWS event-stream framing.
//!
//! Every frame on the Transcribe websocket is one message:
//!
//! ```text
//! [total length: u32][headers length: u32][prelude crc: u32]
//! [headers ...][payload ...][message crc: u32]
//! ```
//!
//! Integers are big-endian. The prelude CRC covers the first eight bytes and
//! the message CRC covers everything before it.

const PRELUDE_LEN: usize = 12;
const TRAILER_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventStreamError {
    #[error("frame too short: {0} bytes")]
    Truncated(usize),

    #[error("frame length {declared} does not match {actual} received bytes")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("prelude checksum mismatch")]
    PreludeChecksum,

    #[error("message checksum mismatch")]
    MessageChecksum,

    #[error("unknown header value type {0}")]
    UnknownHeaderType(u8),

    #[error("header '{0}' is malformed")]
    MalformedHeader(String),

    #[error("header or value too long: {0}")]
    TooLong(String),
}

/// Typed header value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Bytes(Vec<u8>),
    String(String),
    Timestamp(i64),
    Uuid([u8; 16]),
}

impl HeaderValue {
    fn type_id(&self) -> u8 {
        match self {
            HeaderValue::Bool(true) => 0,
            HeaderValue::Bool(false) => 1,
            HeaderValue::Byte(_) => 2,
            HeaderValue::Short(_) => 3,
            HeaderValue::Int(_) => 4,
            HeaderValue::Long(_) => 5,
            HeaderValue::Bytes(_) => 6,
            HeaderValue::String(_) => 7,
            HeaderValue::Timestamp(_) => 8,
            HeaderValue::Uuid(_) => 9,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::String(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: HeaderValue,
}

impl Header {
    pub fn string(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: HeaderValue::String(value.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub headers: Vec<Header>,
    pub payload: Vec<u8>,
}

impl Message {
    /// An `AudioEvent` carrying one chunk of PCM audio
    pub fn audio_event(chunk: &[u8]) -> Self {
        Self {
            headers: vec![
                Header::string(":content-type", "application/octet-stream"),
                Header::string(":event-type", "AudioEvent"),
                Header::string(":message-type", "event"),
            ],
            payload: chunk.to_vec(),
        }
    }

    /// The empty audio event that tells the service no more audio follows
    pub fn end_of_stream() -> Self {
        Self::audio_event(&[])
    }

    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.iter().find(|h| h.name == name).map(|h| &h.value)
    }

    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.header(name).and_then(HeaderValue::as_str)
    }

    pub fn is_exception(&self) -> bool {
        matches!(self.header_str(":message-type"), Some("exception") | Some("error"))
    }

    /// Serialize into a single frame
    pub fn encode(&self) -> Result<Vec<u8>, EventStreamError> {
        let headers = encode_headers(&self.headers)?;
        let total_len = PRELUDE_LEN + headers.len() + self.payload.len() + TRAILER_LEN;
        let total = u32::try_from(total_len).map_err(|_| EventStreamError::TooLong("message".to_string()))?;
        let headers_len =
            u32::try_from(headers.len()).map_err(|_| EventStreamError::TooLong("headers".to_string()))?;

        let mut frame = Vec::with_capacity(total_len);
        frame.extend_from_slice(&total.to_be_bytes());
        frame.extend_from_slice(&headers_len.to_be_bytes());
        let prelude_crc = crc32fast::hash(&frame);
        frame.extend_from_slice(&prelude_crc.to_be_bytes());
        frame.extend_from_slice(&headers);
        frame.extend_from_slice(&self.payload);
        let message_crc = crc32fast::hash(&frame);
        frame.extend_from_slice(&message_crc.to_be_bytes());
        Ok(frame)
    }

    /// Parse one complete frame
    pub fn decode(frame: &[u8]) -> Result<Self, EventStreamError> {
        if frame.len() < PRELUDE_LEN + TRAILER_LEN {
            return Err(EventStreamError::Truncated(frame.len()));
        }

        let total_len = read_u32(&frame[0..4]) as usize;
        let headers_len = read_u32(&frame[4..8]) as usize;
        if total_len != frame.len() {
            return Err(EventStreamError::LengthMismatch {
                declared: total_len,
                actual: frame.len(),
            });
        }
        if crc32fast::hash(&frame[0..8]) != read_u32(&frame[8..12]) {
            return Err(EventStreamError::PreludeChecksum);
        }
        let crc_offset = total_len - TRAILER_LEN;
        if crc32fast::hash(&frame[..crc_offset]) != read_u32(&frame[crc_offset..]) {
            return Err(EventStreamError::MessageChecksum);
        }

        let headers_end = PRELUDE_LEN + headers_len;
        if headers_end > crc_offset {
            return Err(EventStreamError::LengthMismatch {
                declared: headers_end,
                actual: crc_offset,
            });
        }

        Ok(Self {
            headers: decode_headers(&frame[PRELUDE_LEN..headers_end])?,
            payload: frame[headers_end..crc_offset].to_vec(),
        })
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn encode_headers(headers: &[Header]) -> Result<Vec<u8>, EventStreamError> {
    let mut out = Vec::new();
    for header in headers {
        let name = header.name.as_bytes();
        let name_len = u8::try_from(name.len()).map_err(|_| EventStreamError::TooLong(header.name.clone()))?;
        out.push(name_len);
        out.extend_from_slice(name);
        out.push(header.value.type_id());

        match &header.value {
            HeaderValue::Bool(_) => {}
            HeaderValue::Byte(v) => out.extend_from_slice(&v.to_be_bytes()),
            HeaderValue::Short(v) => out.extend_from_slice(&v.to_be_bytes()),
            HeaderValue::Int(v) => out.extend_from_slice(&v.to_be_bytes()),
            HeaderValue::Long(v) | HeaderValue::Timestamp(v) => out.extend_from_slice(&v.to_be_bytes()),
            HeaderValue::Bytes(bytes) => {
                let len = u16::try_from(bytes.len()).map_err(|_| EventStreamError::TooLong(header.name.clone()))?;
                out.extend_from_slice(&len.to_be_bytes());
                out.extend_from_slice(bytes);
            }
            HeaderValue::String(text) => {
                let len = u16::try_from(text.len()).map_err(|_| EventStreamError::TooLong(header.name.clone()))?;
                out.extend_from_slice(&len.to_be_bytes());
                out.extend_from_slice(text.as_bytes());
            }
            HeaderValue::Uuid(bytes) => out.extend_from_slice(bytes),
        }
    }
    Ok(out)
}

/// Cursor over the header block
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize, header: &str) -> Result<&'a [u8], EventStreamError> {
        let end = self.pos + n;
        if end > self.bytes.len() {
            return Err(EventStreamError::MalformedHeader(header.to_string()));
        }
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self, header: &str) -> Result<[u8; N], EventStreamError> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.take(N, header)?);
        Ok(array)
    }
}

fn decode_headers(bytes: &[u8]) -> Result<Vec<Header>, EventStreamError> {
    let mut reader = Reader { bytes, pos: 0 };
    let mut headers = Vec::new();

    while reader.pos < bytes.len() {
        let [name_len] = reader.take_array::<1>("")?;
        let name = String::from_utf8(reader.take(name_len as usize, "")?.to_vec())
            .map_err(|_| EventStreamError::MalformedHeader("<non-utf8 name>".to_string()))?;
        let [type_id] = reader.take_array::<1>(&name)?;

        let value = match type_id {
            0 => HeaderValue::Bool(true),
            1 => HeaderValue::Bool(false),
            2 => HeaderValue::Byte(i8::from_be_bytes(reader.take_array(&name)?)),
            3 => HeaderValue::Short(i16::from_be_bytes(reader.take_array(&name)?)),
            4 => HeaderValue::Int(i32::from_be_bytes(reader.take_array(&name)?)),
            5 => HeaderValue::Long(i64::from_be_bytes(reader.take_array(&name)?)),
            6 | 7 => {
                let len = u16::from_be_bytes(reader.take_array(&name)?) as usize;
                let data = reader.take(len, &name)?.to_vec();
                if type_id == 6 {
                    HeaderValue::Bytes(data)
                } else {
                    HeaderValue::String(
                        String::from_utf8(data).map_err(|_| EventStreamError::MalformedHeader(name.clone()))?,
                    )
                }
            }
            8 => HeaderValue::Timestamp(i64::from_be_bytes(reader.take_array(&name)?)),
            9 => HeaderValue::Uuid(reader.take_array(&name)?),
            other => return Err(EventStreamError::UnknownHeaderType(other)),
        };

        headers.push(Header { name, value });
    }

    Ok(headers)
}
