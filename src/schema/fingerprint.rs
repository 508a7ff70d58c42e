use super::types::field::FieldDescriptor;

/// Seed and polynomial of the 64-bit Rabin fingerprint (CRC-64-AVRO).
const INIT: u64 = 0xc15d_213a_a4d7_a795;

const FP_TABLE: [u64; 256] = build_table();

const fn build_table() -> [u64; 256] {
    let mut table = [0u64; 256];
    let mut i = 0;
    while i < 256 {
        let mut fp = i as u64;
        let mut j = 0;
        while j < 8 {
            fp = (fp >> 1) ^ (INIT & (fp & 1).wrapping_neg());
            j += 1;
        }
        table[i] = fp;
        i += 1;
    }
    table
}

/// Derives schema ids from schema structure.
///
/// The fingerprint folds, in this order: the type name, the number of fields,
/// then for every field in name order its name and its kind id. Strings are
/// folded as their UTF-8 length (4 bytes, little endian) followed by the bytes;
/// integers as 4 little-endian bytes. Data encoded by other members is only
/// readable if they derive ids with exactly this procedure.
pub struct SchemaFingerprint;

impl SchemaFingerprint {
    /// Computes the schema id for a type name and its name-ordered fields.
    pub fn compute<'a, I>(type_name: &str, fields: I) -> i64
    where
        I: ExactSizeIterator<Item = &'a FieldDescriptor>,
    {
        let mut fp = Self::fold_str(INIT, type_name);
        fp = Self::fold_i32(fp, fields.len() as i32);
        for field in fields {
            fp = Self::fold_str(fp, field.name());
            fp = Self::fold_i32(fp, field.kind().id());
        }
        fp as i64
    }

    fn fold_byte(fp: u64, byte: u8) -> u64 {
        (fp >> 8) ^ FP_TABLE[((fp ^ u64::from(byte)) & 0xff) as usize]
    }

    fn fold_i32(fp: u64, value: i32) -> u64 {
        value
            .to_le_bytes()
            .iter()
            .fold(fp, |acc, byte| Self::fold_byte(acc, *byte))
    }

    fn fold_str(fp: u64, value: &str) -> u64 {
        let bytes = value.as_bytes();
        let fp = Self::fold_i32(fp, bytes.len() as i32);
        bytes.iter().fold(fp, |acc, byte| Self::fold_byte(acc, *byte))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::FieldKind;

    fn fields(declared: &[(&str, FieldKind)]) -> Vec<FieldDescriptor> {
        declared
            .iter()
            .map(|(name, kind)| FieldDescriptor::new(*name, *kind))
            .collect()
    }

    #[test]
    fn test_table_matches_known_entries() {
        assert_eq!(FP_TABLE[0], 0);
        assert_eq!(FP_TABLE[1], 0x2cf1_cba6_b753_51fa);
        assert_eq!(FP_TABLE[128], INIT);
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = fields(&[("x", FieldKind::Int32), ("y", FieldKind::Int32)]);
        let b = fields(&[("x", FieldKind::Int32), ("y", FieldKind::Int32)]);
        assert_eq!(
            SchemaFingerprint::compute("Point", a.iter()),
            SchemaFingerprint::compute("Point", b.iter())
        );
    }

    #[test]
    fn test_fingerprint_depends_on_every_component() {
        let base = fields(&[("x", FieldKind::Int32), ("y", FieldKind::Int32)]);
        let id = SchemaFingerprint::compute("Point", base.iter());

        let renamed_type = SchemaFingerprint::compute("Point3", base.iter());
        let other_kind = fields(&[("x", FieldKind::Int32), ("y", FieldKind::Int64)]);
        let other_name = fields(&[("x", FieldKind::Int32), ("z", FieldKind::Int32)]);
        let fewer = fields(&[("x", FieldKind::Int32)]);

        assert_ne!(id, renamed_type);
        assert_ne!(id, SchemaFingerprint::compute("Point", other_kind.iter()));
        assert_ne!(id, SchemaFingerprint::compute("Point", other_name.iter()));
        assert_ne!(id, SchemaFingerprint::compute("Point", fewer.iter()));
    }

    #[test]
    fn test_length_prefix_separates_name_boundaries() {
        let split_one = fields(&[("ab", FieldKind::Int32)]);
        let split_two = fields(&[("b", FieldKind::Int32)]);
        assert_ne!(
            SchemaFingerprint::compute("a", split_one.iter()),
            SchemaFingerprint::compute("aa", split_two.iter())
        );
    }
}
