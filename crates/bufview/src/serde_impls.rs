//! `serde` support: views serialize as plain sequences, text as a string when
//! it is valid UTF-8 and as bytes otherwise.

use alloc::{string::String, vec::Vec};
use core::{fmt, marker::PhantomData};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{Error, SeqAccess, Unexpected, Visitor},
    ser::SerializeSeq,
};

use crate::{FixedSeq, SeqView, TextView, utf8::CodePoint};

impl<T: Serialize> Serialize for SeqView<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.with_slice(|elements| {
            let mut seq = serializer.serialize_seq(Some(elements.len()))?;
            for element in elements {
                seq.serialize_element(element)?;
            }
            seq.end()
        })
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for SeqView<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<T>::deserialize(deserializer).map(SeqView::from_vec)
    }
}

impl<T: Serialize, const N: usize> Serialize for FixedSeq<T, N> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.as_slice().serialize(serializer)
    }
}

struct FixedSeqVisitor<T, const N: usize>(PhantomData<T>);

impl<'de, T: Deserialize<'de>, const N: usize> Visitor<'de> for FixedSeqVisitor<T, N> {
    type Value = FixedSeq<T, N>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a sequence of exactly {N} elements")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut elements = Vec::with_capacity(N);
        while let Some(element) = seq.next_element()? {
            if elements.len() == N {
                return Err(Error::invalid_length(N + 1, &self));
            }
            elements.push(element);
        }
        let len = elements.len();
        let elements: [T; N] = elements
            .try_into()
            .map_err(|_| Error::invalid_length(len, &self))?;
        Ok(FixedSeq::new(elements))
    }
}

impl<'de, T: Deserialize<'de>, const N: usize> Deserialize<'de> for FixedSeq<T, N> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(FixedSeqVisitor(PhantomData))
    }
}

impl Serialize for CodePoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_char(self.as_char())
    }
}

impl<'de> Deserialize<'de> for CodePoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        char::deserialize(deserializer).map(CodePoint::from)
    }
}

impl Serialize for TextView {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.to_str() {
            Some(text) => serializer.serialize_str(text),
            None => serializer.serialize_bytes(self.as_bytes()),
        }
    }
}

struct TextViewVisitor;

impl<'de> Visitor<'de> for TextViewVisitor {
    type Value = TextView;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string or a byte array")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: Error,
    {
        Ok(TextView::from(value))
    }

    fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
    where
        E: Error,
    {
        Ok(TextView::from(value))
    }

    fn visit_bytes<E>(self, value: &[u8]) -> Result<Self::Value, E>
    where
        E: Error,
    {
        Ok(TextView::from_literal(value))
    }

    fn visit_byte_buf<E>(self, value: Vec<u8>) -> Result<Self::Value, E>
    where
        E: Error,
    {
        Ok(TextView::from(value))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(byte) = seq.next_element::<u16>()? {
            let byte = u8::try_from(byte).map_err(|_| {
                Error::invalid_value(Unexpected::Unsigned(u64::from(byte)), &"a byte")
            })?;
            bytes.push(byte);
        }
        Ok(TextView::from(bytes))
    }
}

impl<'de> Deserialize<'de> for TextView {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TextViewVisitor)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn views_serialize_as_their_live_elements() {
        let view = SeqView::from_vec(vec![1, 2, 3, 4]).slice(1, 3).unwrap();
        assert_eq!(serde_json::to_string(&view).unwrap(), "[2,3]");
        let back: SeqView<i32> = serde_json::from_str("[2,3]").unwrap();
        assert_eq!(back, view);
        assert_eq!(back.capacity(), 2);
    }

    #[test]
    fn fixed_sequences_check_their_length() {
        let seq = FixedSeq::new([1u8, 2, 3]);
        let json = serde_json::to_string(&seq).unwrap();
        assert_eq!(json, "[1,2,3]");
        assert_eq!(serde_json::from_str::<FixedSeq<u8, 3>>(&json).unwrap(), seq);
        assert!(serde_json::from_str::<FixedSeq<u8, 2>>(&json).is_err());
        assert!(serde_json::from_str::<FixedSeq<u8, 4>>(&json).is_err());
    }

    #[test]
    fn text_is_a_string_when_it_can_be() {
        let text = TextView::from("héllo");
        assert_eq!(serde_json::to_string(&text).unwrap(), r#""héllo""#);
        let back: TextView = serde_json::from_str(r#""héllo""#).unwrap();
        assert_eq!(back, text);

        let raw = TextView::from_literal(b"\xFFa");
        let json = serde_json::to_string(&raw).unwrap();
        assert_eq!(json, "[255,97]");
        assert_eq!(serde_json::from_str::<TextView>(&json).unwrap(), raw);
        assert!(serde_json::from_str::<TextView>("[256]").is_err());
    }

    #[test]
    fn code_points_are_chars() {
        let cps = SeqView::from_vec(vec![CodePoint::from('a'), CodePoint::REPLACEMENT]);
        let json = serde_json::to_string(&cps).unwrap();
        assert_eq!(json, r#"["a","�"]"#);
        let back: SeqView<CodePoint> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cps);
    }
}
