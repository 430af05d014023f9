//! Module to serialize and enarmor a TPK and add informative headers.
use std::io;
use std::str;

use armor;
use Result;
use RevocationStatus;
use serialize::Serialize;
use TPK;


/// Whether or not a character is printable.
pub(crate) fn is_printable(c: &char) -> bool {
    // c.is_ascii_alphanumeric || c.is_whitespace || c.is_ascii_punctuation
    // would exclude any utf8 character, so it seems that to obtain all
    // printable chars, it works just excluding the control chars.
    !c.is_control() && !c.is_ascii_control()
}


/// A `TPK` to be armored and serialized.
pub struct Encoder<'a> {
    tpk: &'a TPK,
}


impl<'a> Encoder<'a> {
    /// Returns a new Encoder to enarmor and serialize a `TPK`.
    pub fn new(tpk: &'a TPK) -> Self {
        Self {
            tpk: tpk,
        }
    }
}

impl<'a> Serialize for Encoder<'a> {
    /// Enarmor and serialize the `TPK` including headers.
    fn serialize(&self, o: &mut dyn io::Write) -> Result<()> {
        let length_value = armor::LINE_LENGTH - "Comment: ".len();
        // Create a header per userid.
        let mut headers: Vec<(String, String)> = self.tpk.userids()
            // Ignore revoked userids.
            .filter_map(|uidb| {
                if let RevocationStatus::Revoked(_) = uidb.revoked(None) {
                    None
                } else {
                    Some(uidb)
                }
            // Ignore userids not "alive".
            }).filter_map(|uidb| {
                if uidb.binding_signature()?.signature_alive() {
                    Some(uidb)
                } else {
                    None
                }
            // Ignore userids with non-printable characters.
            }).filter_map(|uidb| {
                let value = str::from_utf8(uidb.userid().value()).ok()?;
                for c in value.chars().take(length_value) {
                    if !is_printable(&c){
                        return None;
                    }
                }
                // Make sure the line length does not exceed armor::LINE_LENGTH
                let header: String = value.chars().take(length_value)
                    .collect();
                Some(("Comment".into(), header))
            }).collect();

        // Add the fingerprint to the headers
        let fpr = self.tpk.fingerprint().to_string();
        headers.push(("Comment".into(), fpr));

        // Convert the Vec<(String, String)> into Vec<(&str, &str)>
        // `iter_into` can not be used here because will take ownership and
        // what is needed is the reference.
        let headers: Vec<_> = headers.iter()
            .map(|&(ref x, ref y)| (&x[..], &y[..]))
            .collect();

        let mut w = armor::Writer::new(o, armor::Kind::PublicKey, &headers)?;
        self.tpk.serialize(&mut w)
    }
}
