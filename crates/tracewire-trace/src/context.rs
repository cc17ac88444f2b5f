//! Trace context propagation (B3 format).

use tracewire_core::{HexId, MetadataBag, TraceIdentifier};

/// B3 header names in Zipkin's canonical casing.
pub mod headers {
    pub const TRACE_ID: &str = "X-B3-TraceId";
    pub const SPAN_ID: &str = "X-B3-SpanId";
    pub const PARENT_SPAN_ID: &str = "X-B3-ParentSpanId";
    pub const SAMPLED: &str = "X-B3-Sampled";
    pub const FLAGS: &str = "X-B3-Flags";
}

/// First value of a header, looked up case-insensitively.
pub fn read_header<'a>(bag: &'a MetadataBag, name: &str) -> Option<&'a str> {
    bag.get(name)
}

/// Whether the bag carries enough to continue an existing trace.
pub fn has_incoming_trace(bag: &MetadataBag) -> bool {
    let present = |name: &str| read_header(bag, name).is_some_and(|v| !v.is_empty());
    present(headers::TRACE_ID) && present(headers::SPAN_ID)
}

/// Only `"1"` means sampled.
pub fn decode_boolean(s: &str) -> bool {
    s == "1"
}

/// [`decode_boolean`] over a possibly absent header.
pub fn decode_boolean_opt(s: Option<&str>) -> bool {
    s.is_some_and(decode_boolean)
}

/// Parse a base-10 integer, treating anything malformed as absent.
pub fn decode_int_or_absent(s: Option<&str>) -> Option<u32> {
    s.and_then(|v| v.trim().parse().ok())
}

/// Wire form of the sampling decision; undecided is sent as unsampled.
pub fn encode_sampled(sampled: Option<bool>) -> &'static str {
    if sampled.unwrap_or(false) { "1" } else { "0" }
}

/// Encode an identifier into a fresh metadata bag.
///
/// The parent header is omitted for identifiers without a parent.
pub fn encode(id: &TraceIdentifier) -> MetadataBag {
    let mut bag = MetadataBag::new();
    inject(id, &mut bag);
    bag
}

/// Write the B3 headers for `id` into `bag`, replacing previous values.
pub fn inject(id: &TraceIdentifier, bag: &mut MetadataBag) {
    bag.set(headers::TRACE_ID, id.trace_id.as_str());
    match &id.parent_id {
        Some(parent) => bag.set(headers::PARENT_SPAN_ID, parent.as_str()),
        None => {
            bag.remove(headers::PARENT_SPAN_ID);
        }
    }
    bag.set(headers::SPAN_ID, id.span_id.as_str());
    bag.set(headers::SAMPLED, encode_sampled(id.sampled));
}

/// Rebuild the caller's identifier from incoming headers.
///
/// Values are carried as read; a missing sampled header stays undecided and
/// malformed flags fall back to 0. Returns `None` when the bag does not
/// carry an incoming trace.
pub fn extract(bag: &MetadataBag) -> Option<TraceIdentifier> {
    if !has_incoming_trace(bag) {
        return None;
    }
    let span_id = read_header(bag, headers::SPAN_ID)?;

    Some(TraceIdentifier {
        trace_id: read_header(bag, headers::TRACE_ID).map(HexId::from)?,
        parent_id: read_header(bag, headers::PARENT_SPAN_ID).map(HexId::from),
        span_id: HexId::from(span_id),
        sampled: read_header(bag, headers::SAMPLED).map(decode_boolean),
        flags: decode_int_or_absent(read_header(bag, headers::FLAGS)).unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn incoming(pairs: &[(&str, &str)]) -> MetadataBag {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_read_header_any_casing() {
        for stored in ["X-B3-TraceId", "x-b3-traceid", "X-B3-TRACEID"] {
            let bag = incoming(&[(stored, "abc")]);
            for lookup in ["X-B3-TraceId", "x-b3-traceid", "X-B3-TRACEID"] {
                assert_eq!(read_header(&bag, lookup), Some("abc"));
            }
        }
    }

    #[test]
    fn test_has_incoming_trace() {
        assert!(has_incoming_trace(&incoming(&[
            ("x-b3-traceid", "abc"),
            ("x-b3-spanid", "def"),
        ])));
        assert!(!has_incoming_trace(&incoming(&[("x-b3-traceid", "abc")])));
        assert!(!has_incoming_trace(&incoming(&[("x-b3-spanid", "def")])));
        assert!(!has_incoming_trace(&incoming(&[
            ("x-b3-traceid", ""),
            ("x-b3-spanid", "def"),
        ])));
        assert!(!has_incoming_trace(&MetadataBag::new()));
    }

    #[test]
    fn test_decode_boolean() {
        assert!(decode_boolean("1"));
        assert!(!decode_boolean("0"));
        assert!(!decode_boolean("true"));
        assert!(!decode_boolean(""));
        assert!(!decode_boolean_opt(None));
        assert!(decode_boolean_opt(Some("1")));
    }

    #[test]
    fn test_decode_int_or_absent() {
        assert_eq!(decode_int_or_absent(Some("42")), Some(42));
        assert_eq!(decode_int_or_absent(Some("abc")), None);
        assert_eq!(decode_int_or_absent(Some("")), None);
        assert_eq!(decode_int_or_absent(None), None);
    }

    #[test]
    fn test_sampled_roundtrip() {
        assert!(decode_boolean(encode_sampled(Some(true))));
        assert!(!decode_boolean(encode_sampled(Some(false))));
        assert_eq!(encode_sampled(None), "0");
    }

    #[test]
    fn test_encode_child() {
        let id = TraceIdentifier {
            trace_id: HexId::from("463ac35c9f6413ad"),
            parent_id: Some(HexId::from("72485a3953bb6124")),
            span_id: HexId::from("a2fb4a1d1a96d312"),
            sampled: Some(true),
            flags: 0,
        };

        let bag = encode(&id);
        assert_eq!(
            bag.iter().collect::<Vec<_>>(),
            vec![
                ("x-b3-traceid", "463ac35c9f6413ad"),
                ("x-b3-parentspanid", "72485a3953bb6124"),
                ("x-b3-spanid", "a2fb4a1d1a96d312"),
                ("x-b3-sampled", "1"),
            ]
        );
    }

    #[test]
    fn test_encode_root_omits_parent() {
        let id = TraceIdentifier::root(HexId::from("463ac35c9f6413ad"));
        let bag = encode(&id);

        assert_eq!(bag.len(), 3);
        assert!(!bag.contains_key(headers::PARENT_SPAN_ID));
        assert_eq!(read_header(&bag, headers::SAMPLED), Some("0"));
    }

    #[test]
    fn test_inject_replaces_previous_headers() {
        let mut bag = incoming(&[
            ("x-b3-traceid", "old"),
            ("x-b3-parentspanid", "old-parent"),
            ("authorization", "Bearer t"),
        ]);
        inject(&TraceIdentifier::root(HexId::from("new")), &mut bag);

        assert_eq!(read_header(&bag, headers::TRACE_ID), Some("new"));
        assert_eq!(read_header(&bag, headers::PARENT_SPAN_ID), None);
        assert_eq!(read_header(&bag, "authorization"), Some("Bearer t"));
    }

    #[test]
    fn test_extract_carries_values_as_read() {
        let bag = incoming(&[
            ("X-B3-TraceId", "abc"),
            ("X-B3-SpanId", "def"),
            ("X-B3-ParentSpanId", "ghi"),
            ("X-B3-Sampled", "1"),
            ("X-B3-Flags", "1"),
        ]);

        assert_eq!(
            extract(&bag),
            Some(TraceIdentifier {
                trace_id: HexId::from("abc"),
                parent_id: Some(HexId::from("ghi")),
                span_id: HexId::from("def"),
                sampled: Some(true),
                flags: 1,
            })
        );
    }

    #[test]
    fn test_extract_degrades_malformed_values() {
        let bag = incoming(&[
            ("x-b3-traceid", "abc"),
            ("x-b3-spanid", "def"),
            ("x-b3-sampled", "yes"),
            ("x-b3-flags", "debug"),
        ]);

        let id = extract(&bag).unwrap();
        assert_eq!(id.sampled, Some(false));
        assert_eq!(id.flags, 0);
        assert_eq!(id.parent_id, None);
    }

    #[test]
    fn test_extract_without_trace() {
        assert_eq!(extract(&incoming(&[("x-b3-spanid", "def")])), None);
    }
}
