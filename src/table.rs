use super::parse::Group;
use super::pattern::CompiledPattern;
use super::*;

/// All the patterns of one group that share a mask value, in source order.
#[derive(Debug)]
pub struct Bucket {
    pub mask: u64,
    pub entries: Vec<CompiledPattern>,
}

/// One decode stage: the buckets of one group, in first-seen mask order.
#[derive(Debug)]
pub struct DecodeTable {
    pub buckets: Vec<Bucket>,
}

impl DecodeTable {
    fn new() -> DecodeTable { DecodeTable { buckets: Vec::new() } }
    pub fn is_empty(&self) -> bool { self.buckets.is_empty() }
}

/// Accumulates decode tables one pattern at a time. The builder is an
/// explicit value owned by the run; nothing survives it but the tables it
/// hands back from `finish`.
pub struct TableBuilder {
    tables: Vec<DecodeTable>,
    current: DecodeTable,
}

impl TableBuilder {
    pub fn new() -> TableBuilder {
        TableBuilder {
            tables: Vec::new(),
            current: DecodeTable::new(),
        }
    }

    /// Append a pattern to its mask bucket in the current group, creating the
    /// bucket on first sight. Two patterns sharing (mask, key) would emit two
    /// dispatch cases under one selector value, so the collision is refused.
    pub fn add(&mut self, pattern: CompiledPattern) -> Result<(), Error> {
        let idx = match self.current.buckets.iter().position(|b| b.mask == pattern.mask) {
            Some(idx) => idx,
            None => {
                self.current.buckets.push(Bucket {
                    mask: pattern.mask,
                    entries: Vec::new(),
                });
                self.current.buckets.len() - 1
            }
        };
        let bucket = &mut self.current.buckets[idx];
        if let Some(prev) = bucket.entries.iter().find(|e| e.key == pattern.key) {
            return Err(conflict_err!(format!(
                "patterns \"{}\" and \"{}\" collide on mask {:#x}, key {:#x}",
                prev.name, pattern.name, pattern.mask, pattern.key
            )));
        }
        bucket.entries.push(pattern);
        Ok(())
    }

    /// Close the current group and open the next decode stage.
    pub fn start_group(&mut self) {
        self.tables.push(std::mem::replace(&mut self.current, DecodeTable::new()));
    }

    /// Close the final (possibly empty) group and hand back all tables.
    pub fn finish(mut self) -> Vec<DecodeTable> {
        self.tables.push(self.current);
        self.tables
    }
}

/// Run parser output through a builder, one table per group, same order.
pub fn build(groups: Vec<Group>) -> Result<Vec<DecodeTable>, Error> {
    let mut builder = TableBuilder::new();
    for (i, group) in groups.into_iter().enumerate() {
        if i > 0 {
            builder.start_group();
        }
        for pattern in group {
            builder.add(pattern)?;
        }
    }
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::driver::Driver;
    use super::parse::Parser;
    use super::*;

    fn groups_of(text: &str) -> Vec<Group> { Parser::new(Driver::Direct).parse(text).unwrap() }

    #[test]
    fn buckets_split_on_mask() -> Result<(), Error> {
        // both can match 0b1100 once masked, but the masks differ
        let tables = build(groups_of("INSTPAT(\"1100\", fixed);\nINSTPAT(\"11??\", wild);\n"))?;
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].buckets.len(), 2);
        assert_eq!(tables[0].buckets[0].mask, 0b1111);
        assert_eq!(tables[0].buckets[1].mask, 0b1100);
        Ok(())
    }

    #[test]
    fn bucket_order_is_first_seen() -> Result<(), Error> {
        let tables = build(groups_of(
            "INSTPAT(\"00??\", a);\nINSTPAT(\"1111\", b);\nINSTPAT(\"01??\", c);\n",
        ))?;
        let table = &tables[0];
        assert_eq!(table.buckets.len(), 2);
        assert_eq!(table.buckets[0].mask, 0b1100);
        assert_eq!(table.buckets[1].mask, 0b1111);
        // entries within a bucket stay in source order
        assert_eq!(table.buckets[0].entries[0].name, "a");
        assert_eq!(table.buckets[0].entries[1].name, "c");
        Ok(())
    }

    #[test]
    fn one_table_per_group() -> Result<(), Error> {
        let tables = build(groups_of("INSTPAT(\"1\", a);\n---\nINSTPAT(\"0\", b);\n---\n"))?;
        assert_eq!(tables.len(), 3);
        assert_eq!(tables[0].buckets[0].entries[0].name, "a");
        assert_eq!(tables[1].buckets[0].entries[0].name, "b");
        assert!(tables[2].is_empty());
        Ok(())
    }

    #[test]
    fn duplicate_mask_and_key_is_refused() {
        let e = build(groups_of("INSTPAT(\"0110011\", add);\nINSTPAT(\"0110011\", also_add);\n")).unwrap_err();
        assert_eq!(e.kind, ErrorKind::Conflict);
        assert!(e.msg.contains("add"));
        assert!(e.msg.contains("also_add"));
    }

    #[test]
    fn same_key_in_different_groups_is_fine() -> Result<(), Error> {
        let tables = build(groups_of("INSTPAT(\"0110011\", add);\n---\nINSTPAT(\"0110011\", add);\n"))?;
        assert_eq!(tables.len(), 2);
        Ok(())
    }
}
