//! Value adapters for the wire codec and the file store, plus the drop-hook
//! type used by the ownership policy.

use std::rc::Rc;

/// Per-entry drop hook. Runs exactly once when the entry leaves the table
/// (delete, update overwrite, or table drop), before the value itself is
/// dropped. `Rc` so a hook can be shared across entries and across clones.
pub type DropFn<V> = Rc<dyn Fn(&mut V)>;

/// Values that can travel through the binary wire format.
///
/// The wire carries opaque byte strings; a type opts in by exposing its
/// bytes and by rebuilding itself from decoded bytes. Rebuilding may reject
/// the bytes (`None`), which `unpack` reports as corrupt wire data.
pub trait WireValue: Sized {
    fn wire_bytes(&self) -> &[u8];
    fn from_wire(bytes: Vec<u8>) -> Option<Self>;
}

impl WireValue for String {
    fn wire_bytes(&self) -> &[u8] {
        self.as_bytes()
    }

    fn from_wire(bytes: Vec<u8>) -> Option<Self> {
        String::from_utf8(bytes).ok()
    }
}

impl WireValue for Vec<u8> {
    fn wire_bytes(&self) -> &[u8] {
        self
    }

    fn from_wire(bytes: Vec<u8>) -> Option<Self> {
        Some(bytes)
    }
}

/// Values that can travel through the `name=value` text file format.
///
/// The text side is narrower than the wire side: values must render as
/// printable single-line text. Loading never fails; a line's value text is
/// taken verbatim.
pub trait TextValue: Sized {
    fn text(&self) -> &str;
    fn from_text(text: &str) -> Self;
}

impl TextValue for String {
    fn text(&self) -> &str {
        self
    }

    fn from_text(text: &str) -> Self {
        text.to_string()
    }
}
