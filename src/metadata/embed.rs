//! EXIF block construction, embedding and parsing.
//!
//! The output block starts from the primary IFD of the source image (when it
//! parses) and overrides the provenance fields. It is spliced into the
//! encoded JPEG as an APP1 segment.

use super::record::ProvenanceRecord;
use super::MetadataError;
use crate::constants::DEFAULT_ARTIST;
use crate::watermark::WatermarkJob;
use exif::experimental::Writer;
use exif::{Context, Exif, Field, In, Tag, Value};
use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageEXIF};
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

/// Windows title slot (UTF-16LE)
pub const XP_TITLE: Tag = Tag(Context::Tiff, 0x9C9B);
/// Windows comment slot (UTF-16LE)
pub const XP_COMMENT: Tag = Tag(Context::Tiff, 0x9C9C);
/// Windows subject slot (UTF-16LE)
pub const XP_SUBJECT: Tag = Tag(Context::Tiff, 0x9C9F);
/// DocumentName (ASCII)
pub const DOCUMENT_NAME: Tag = Tag(Context::Tiff, 0x010D);

/// Character code prefix of UserComment: undefined encoding
const USER_COMMENT_PREFIX: [u8; 8] = [0; 8];
const USER_COMMENT_ASCII_PREFIX: &[u8; 8] = b"ASCII\0\0\0";

/// "Exif\0\0" identifier plus the segment length field
const APP1_OVERHEAD: usize = 6 + 2;
const MAX_SEGMENT_LEN: usize = u16::MAX as usize;

/// Format of the capture-date fields
const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Tags always written by [`build_exif`]; source values are dropped.
const OVERRIDDEN_TAGS: &[Tag] = &[
    Tag::UserComment,
    Tag::Copyright,
    Tag::Artist,
    Tag::Software,
    Tag::DateTimeOriginal,
    Tag::ImageDescription,
    DOCUMENT_NAME,
    XP_TITLE,
    XP_COMMENT,
    XP_SUBJECT,
];

/// Source tags never carried over.
const DROPPED_TAGS: &[Tag] = &[
    Tag::ExifIFDPointer,
    Tag::GPSInfoIFDPointer,
    Tag::InteropIFDPointer,
    Tag::MakerNote,
    Tag::StripOffsets,
    Tag::StripByteCounts,
    Tag::JPEGInterchangeFormat,
    Tag::JPEGInterchangeFormatLength,
];

/// Parse the EXIF block of a source file, if it has a usable one.
pub fn read_source_exif(path: &Path) -> Option<Exif> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => Some(exif),
        Err(e) => {
            tracing::debug!(
                source = %path.display(),
                error = %e,
                "No usable source metadata, starting empty"
            );
            None
        }
    }
}

/// `"{text} - {author}"`, or just the text when there is no author.
pub fn copyright_notice(text: &str, author: &str) -> String {
    let author = author.trim();
    if author.is_empty() {
        text.to_string()
    } else {
        format!("{} - {}", text, author)
    }
}

/// UTF-16LE with a terminating NUL, as the XP* tags expect.
pub fn encode_utf16le(text: &str) -> Vec<u8> {
    let mut bytes: Vec<u8> = text.encode_utf16().flat_map(|unit| unit.to_le_bytes()).collect();
    bytes.extend_from_slice(&[0, 0]);
    bytes
}

fn ascii(tag: Tag, text: &str) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![text.as_bytes().to_vec()]),
    }
}

fn wide(tag: Tag, text: &str) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Byte(encode_utf16le(text)),
    }
}

/// Fields describing the watermark, in write order.
pub fn provenance_fields(
    job: &WatermarkJob,
    record: &ProvenanceRecord,
    document_name: &str,
) -> Result<Vec<Field>, MetadataError> {
    let json = record.to_json().map_err(MetadataError::Serialize)?;
    let mut comment = USER_COMMENT_PREFIX.to_vec();
    comment.extend_from_slice(json.as_bytes());

    let metadata = job.metadata();
    let author = metadata.author.trim();

    let mut fields = vec![
        Field {
            tag: Tag::UserComment,
            ifd_num: In::PRIMARY,
            value: Value::Undefined(comment, 0),
        },
        ascii(Tag::Copyright, &copyright_notice(job.text(), author)),
        ascii(
            Tag::Artist,
            if author.is_empty() { DEFAULT_ARTIST } else { author },
        ),
        ascii(Tag::Software, &metadata.application_name),
        ascii(
            Tag::DateTimeOriginal,
            &record.date_applied.format(EXIF_DATE_FORMAT).to_string(),
        ),
    ];

    if !metadata.title.trim().is_empty() {
        fields.push(ascii(Tag::ImageDescription, &metadata.title));
        fields.push(wide(XP_TITLE, &metadata.title));
    }
    if !metadata.subject.trim().is_empty() {
        fields.push(wide(XP_SUBJECT, &metadata.subject));
    }
    if !metadata.comment.trim().is_empty() {
        fields.push(wide(XP_COMMENT, &metadata.comment));
    }
    fields.push(ascii(DOCUMENT_NAME, document_name));

    Ok(fields)
}

fn carried_over(field: &Field) -> bool {
    field.ifd_num == In::PRIMARY
        && !OVERRIDDEN_TAGS.contains(&field.tag)
        && !DROPPED_TAGS.contains(&field.tag)
        && !matches!(field.value, Value::Unknown(..))
}

/// Build a little-endian TIFF block: source fields merged with provenance.
pub fn build_exif(
    source: Option<&Exif>,
    job: &WatermarkJob,
    record: &ProvenanceRecord,
    document_name: &str,
) -> Result<Vec<u8>, MetadataError> {
    let mut fields: Vec<Field> = source
        .map(|exif| exif.fields().filter(|f| carried_over(f)).cloned().collect())
        .unwrap_or_default();
    let carried = fields.len();
    fields.extend(provenance_fields(job, record, document_name)?);

    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }

    let mut buf = Cursor::new(Vec::new());
    writer
        .write(&mut buf, true)
        .map_err(|e| MetadataError::Build(e.to_string()))?;

    let tiff = buf.into_inner();
    tracing::debug!(
        carried_fields = carried,
        total_fields = fields.len(),
        bytes = tiff.len(),
        "EXIF block built"
    );
    Ok(tiff)
}

/// Insert (or replace) the APP1 EXIF segment of an encoded JPEG.
pub fn embed_exif(jpeg: &[u8], tiff: Vec<u8>) -> Result<Vec<u8>, MetadataError> {
    let segment_len = tiff.len() + APP1_OVERHEAD;
    if segment_len > MAX_SEGMENT_LEN {
        return Err(MetadataError::SegmentTooLarge { size: segment_len });
    }

    let mut image =
        Jpeg::from_bytes(Bytes::copy_from_slice(jpeg)).map_err(|e| MetadataError::Embed(e.to_string()))?;
    image.set_exif(Some(Bytes::from(tiff)));

    let mut out = Vec::new();
    image
        .encoder()
        .write_to(&mut out)
        .map_err(|e| MetadataError::Embed(e.to_string()))?;
    Ok(out)
}

/// Standard fields read back from an output file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddedMetadata {
    pub provenance: Option<ProvenanceRecord>,
    pub copyright: Option<String>,
    pub artist: Option<String>,
    pub software: Option<String>,
    pub date_time_original: Option<String>,
    pub description: Option<String>,
    pub document_name: Option<String>,
    pub xp_title: Option<String>,
    pub xp_subject: Option<String>,
    pub xp_comment: Option<String>,
}

impl EmbeddedMetadata {
    pub fn from_exif(exif: &Exif) -> Self {
        let provenance = exif
            .get_field(Tag::UserComment, In::PRIMARY)
            .and_then(|f| match &f.value {
                Value::Undefined(bytes, _) => Some(strip_user_comment_prefix(bytes)),
                _ => None,
            })
            .and_then(|json| match ProvenanceRecord::from_json(json) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::debug!(error = %e, "UserComment is not a provenance record");
                    None
                }
            });

        Self {
            provenance,
            copyright: ascii_field(exif, Tag::Copyright),
            artist: ascii_field(exif, Tag::Artist),
            software: ascii_field(exif, Tag::Software),
            date_time_original: ascii_field(exif, Tag::DateTimeOriginal),
            description: ascii_field(exif, Tag::ImageDescription),
            document_name: ascii_field(exif, DOCUMENT_NAME),
            xp_title: wide_field(exif, XP_TITLE),
            xp_subject: wide_field(exif, XP_SUBJECT),
            xp_comment: wide_field(exif, XP_COMMENT),
        }
    }
}

/// Read the embedded metadata of a file.
pub fn read_embedded(path: &Path) -> Result<EmbeddedMetadata, MetadataError> {
    let file = File::open(path).map_err(|source| MetadataError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let exif = exif::Reader::new()
        .read_from_container(&mut BufReader::new(file))
        .map_err(|e| MetadataError::Parse(e.to_string()))?;
    Ok(EmbeddedMetadata::from_exif(&exif))
}

fn strip_user_comment_prefix(bytes: &[u8]) -> &[u8] {
    if bytes.len() >= 8 && (bytes[..8] == USER_COMMENT_PREFIX || &bytes[..8] == USER_COMMENT_ASCII_PREFIX)
    {
        &bytes[8..]
    } else {
        bytes
    }
}

fn ascii_field(exif: &Exif, tag: Tag) -> Option<String> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Ascii(parts) => parts
            .first()
            .map(|s| String::from_utf8_lossy(s).trim_end_matches('\0').to_string()),
        _ => None,
    }
}

fn wide_field(exif: &Exif, tag: Tag) -> Option<String> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Byte(bytes) => {
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .take_while(|&unit| unit != 0)
                .collect();
            Some(String::from_utf16_lossy(&units))
        }
        _ => None,
    }
}
