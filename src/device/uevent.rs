//! Parsing of kernel uevent payloads
//!
//! A kobject uevent datagram starts with an `ACTION@DEVPATH` header followed
//! by NUL-separated `KEY=value` pairs:
//!
//! ```text
//! add@/devices/platform/i8042/serio0/input/input3/event3\0ACTION=add\0...
//! ```
//!
//! Only the action prefix and the `event<N>` path segment are used.

use super::DeviceId;

const EVENT_TOKEN: &[u8] = b"event";

/// What happened to the device named in a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotplugAction {
    /// Device node appeared
    Added,
    /// Device node went away
    Removed,
    /// Anything else (change, bind, move, ...), ignored
    Other,
}

impl HotplugAction {
    /// Classify a payload by its leading literal
    pub fn from_payload(buf: &[u8]) -> Self {
        if buf.starts_with(b"add") {
            HotplugAction::Added
        } else if buf.starts_with(b"remove") {
            HotplugAction::Removed
        } else {
            HotplugAction::Other
        }
    }
}

/// Extract the device event index embedded in a payload.
///
/// Takes the segment following the first `event` token up to the next path
/// separator (or NUL, newline, end of buffer) and keeps its trailing digits.
/// Returns an empty id when there is no such token or no digits.
pub fn extract_event_id(buf: &[u8]) -> DeviceId {
    let Some(pos) = find(buf, EVENT_TOKEN) else {
        return DeviceId::default();
    };

    let rest = &buf[pos + EVENT_TOKEN.len()..];
    let end = rest
        .iter()
        .position(|&b| b == b'/' || b == 0 || b == b'\n')
        .unwrap_or(rest.len());
    let segment = &rest[..end];

    let digits_start = segment
        .iter()
        .rposition(|b| !b.is_ascii_digit())
        .map_or(0, |i| i + 1);

    // Digits are ASCII, so this cannot fail
    match std::str::from_utf8(&segment[digits_start..]) {
        Ok(digits) => DeviceId::new(digits),
        Err(_) => DeviceId::default(),
    }
}

/// Run both halves of extraction over one payload
pub fn parse_notification(buf: &[u8]) -> (HotplugAction, DeviceId) {
    (HotplugAction::from_payload(buf), extract_event_id(buf))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_trailing_index_from_segment() {
        let (action, id) = parse_notification(b"add@/devices/.../input/input9/eventUnsigned3/uevent");
        assert_eq!(action, HotplugAction::Added);
        assert_eq!(id.as_str(), "3");
    }

    #[test]
    fn extracts_plain_event_node() {
        let buf = b"remove@/devices/pci0000:00/0000:00:14.0/usb1/1-2/1-2:1.0/input/input21/event17\0ACTION=remove\0SUBSYSTEM=input\0";
        let (action, id) = parse_notification(buf);
        assert_eq!(action, HotplugAction::Removed);
        assert_eq!(id.as_str(), "17");
    }

    #[test]
    fn event_at_end_of_buffer() {
        assert_eq!(extract_event_id(b"add@/devices/virtual/input/input5/event5").as_str(), "5");
    }

    #[test]
    fn missing_event_segment_is_empty() {
        let id = extract_event_id(b"add@/devices/platform/i8042/serio1/input/input4\0ACTION=add\0");
        assert!(id.is_empty());
    }

    #[test]
    fn segment_without_digits_is_empty() {
        assert!(extract_event_id(b"change@/devices/eventful/thing").is_empty());
    }

    #[test]
    fn other_actions() {
        assert_eq!(HotplugAction::from_payload(b"change@/devices/x/event1"), HotplugAction::Other);
        assert_eq!(HotplugAction::from_payload(b"bind@/devices/x"), HotplugAction::Other);
        assert_eq!(HotplugAction::from_payload(b""), HotplugAction::Other);
        assert_eq!(HotplugAction::from_payload(b"libudev\0"), HotplugAction::Other);
    }
}
