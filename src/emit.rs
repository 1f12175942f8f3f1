//! Turning decode tables into a C++ source fragment. The fragment is not a
//! standalone compilation unit; it is meant to be `#include`d inside the body
//! of a hosting dispatch routine that has `inst` in scope. Layout must be
//! byte-stable across regenerations of identical input.
//!
//! Two strategies exist per bucket. The scalar form is a `switch` over the
//! masked input value. The batch-compare form lays the bucket out as three
//! index-aligned arrays and scans them in 8-lane AVX2 chunks; past a minimum
//! table size the straight-line scan beats the branch table the compiler
//! builds from a large `switch`.
use super::driver::Driver;
use super::pattern::{CompiledPattern, WordWidth};
use super::table::{Bucket, DecodeTable};
use super::*;

/// default smallest bucket the batch-compare strategy is emitted for
pub const VECTOR_THRESHOLD: usize = 32;

/// conditional symbol the hosting build defines for 32-bit targets
const WIDTH_SYMBOL: &str = "EMU_WORD32";

pub struct Emitter {
    pub driver: Driver,
    /// action template for the template driver
    pub format: Option<String>,
    /// receiver class for emitted member-function pointers
    pub class: String,
    pub vector: bool,
    pub vector_threshold: usize,
}

impl Emitter {
    pub fn new(driver: Driver) -> Emitter {
        Emitter {
            driver,
            format: None,
            class: String::from("Core"),
            vector: false,
            vector_threshold: VECTOR_THRESHOLD,
        }
    }

    /// Render the whole fragment: guard-macro prolog, one dispatch block per
    /// bucket in table order, then the unmatched sentinel and the `#undef`s.
    pub fn emit(&self, tables: &[DecodeTable]) -> Result<String, Error> {
        let (g32, g64) = self.driver.guard_macros();
        let mut code = String::new();
        code += &format!(
            "#ifdef {sym}\n    #define {g32}(x) x\n    #define {g64}(x)\n#else\n    #define {g32}(x)\n    #define {g64}(x) x\n#endif\n",
            sym = WIDTH_SYMBOL,
            g32 = g32,
            g64 = g64
        );
        for table in tables {
            for bucket in &table.buckets {
                if self.use_vector(bucket) {
                    self.emit_vector(&mut code, bucket)?;
                } else {
                    self.emit_scalar(&mut code, bucket)?;
                }
                code.push('\n');
            }
        }
        code += &format!("\n{}\n\n#undef {}\n#undef {}\n", self.driver.sentinel(), g32, g64);
        Ok(code)
    }

    /// bucket big enough that the straight-line vector scan is worth its setup
    fn use_vector(&self, bucket: &Bucket) -> bool {
        self.vector && self.driver.has_vector_form() && bucket.entries.len() >= self.vector_threshold
    }

    /// the driver's action for one matched entry
    fn action(&self, p: &CompiledPattern) -> Result<String, Error> {
        match self.driver {
            Driver::Direct => Ok(format!("this->exec_{}(); return true;", p.name)),
            Driver::TwoStep => {
                let shape = shape_of(p)?;
                Ok(format!(
                    "this->decode_shape_{}(); this->exec_{}(this->decode_info); return &{}::exec_{};",
                    shape, p.name, self.class, p.name
                ))
            }
            Driver::Template => {
                let t = self
                    .format
                    .as_deref()
                    .ok_or_else(|| general_err!("the template driver requires an action template (--format)"))?;
                Ok(t.replace("{name}", &p.name).replace("{shape}", p.shape.as_deref().unwrap_or("")))
            }
        }
    }

    fn emit_scalar(&self, code: &mut String, bucket: &Bucket) -> Result<(), Error> {
        let (g32, g64) = self.driver.guard_macros();
        code.push_str("{\n");
        *code += &format!("    switch (inst & {:#x}) {{\n", bucket.mask);
        for p in &bucket.entries {
            let action = self.action(p)?;
            match p.width {
                WordWidth::Only32 => *code += &format!("        {}(case {:#x}: {})\n", g32, p.key, action),
                WordWidth::Only64 => *code += &format!("        {}(case {:#x}: {})\n", g64, p.key, action),
                WordWidth::Both => *code += &format!("        case {:#x}: {}\n", p.key, action),
            }
        }
        code.push_str("    }\n}\n");
        Ok(())
    }

    /// Batch-compare form. Width-restricted entries go after the unrestricted
    /// ones, fenced by the same preprocessor condition in every array, so the
    /// arrays stay index-aligned under either compilation.
    fn emit_vector(&self, code: &mut String, bucket: &Bucket) -> Result<(), Error> {
        let mut both: Vec<&CompiledPattern> = Vec::new();
        let mut only32: Vec<&CompiledPattern> = Vec::new();
        let mut only64: Vec<&CompiledPattern> = Vec::new();
        for p in &bucket.entries {
            match p.width {
                WordWidth::Both => both.push(p),
                WordWidth::Only32 => only32.push(p),
                WordWidth::Only64 => only64.push(p),
            }
        }
        let class = self.class.as_str();
        code.push_str("{\n");
        code.push_str("    alignas(64) static constexpr uint32_t keys[] = {\n");
        emit_rows(code, &both, &only32, &only64, |p| Ok(format!("{:#x},", p.key)))?;
        code.push_str("    };\n");
        if self.driver == Driver::TwoStep {
            *code += &format!("    void ({}::*shape_fns[])() = {{\n", class);
            emit_rows(code, &both, &only32, &only64, |p| {
                Ok(format!("&{}::decode_shape_{},", class, shape_of(p)?))
            })?;
            code.push_str("    };\n");
            *code += &format!("    void ({}::*exec_fns[])(const DecodeInfo &) = {{\n", class);
            emit_rows(code, &both, &only32, &only64, |p| Ok(format!("&{}::exec_{},", class, p.name)))?;
            code.push_str("    };\n");
        } else {
            *code += &format!("    void ({}::*exec_fns[])() = {{\n", class);
            emit_rows(code, &both, &only32, &only64, |p| Ok(format!("&{}::exec_{},", class, p.name)))?;
            code.push_str("    };\n");
        }
        *code += &format!("    const __m256i vkey = _mm256_set1_epi32(inst & {:#x});\n", bucket.mask);
        code.push_str("    for (std::size_t i = 0; i < sizeof(keys) / sizeof(keys[0]); i += 8) {\n");
        code.push_str("        __m256i vkeys = _mm256_load_si256((__m256i*)(keys + i));\n");
        code.push_str("        __m256i cmp = _mm256_cmpeq_epi32(vkey, vkeys);\n");
        code.push_str("        uint32_t hit = _mm256_movemask_epi8(cmp);\n");
        code.push_str("        if (hit != 0) {\n");
        code.push_str("            int index = i + __builtin_ctz(hit) / 4;\n");
        if self.driver == Driver::TwoStep {
            code.push_str("            (this->*shape_fns[index])();\n");
            code.push_str("            (this->*exec_fns[index])(this->decode_info);\n");
            code.push_str("            return exec_fns[index];\n");
        } else {
            code.push_str("            (this->*exec_fns[index])();\n");
            code.push_str("            return true;\n");
        }
        code.push_str("        }\n");
        code.push_str("    }\n");
        code.push_str("}\n");
        Ok(())
    }
}

fn shape_of(p: &CompiledPattern) -> Result<&str, Error> {
    p.shape
        .as_deref()
        .ok_or_else(|| general_err!(format!("pattern \"{}\" has no decode-shape name", p.name)))
}

/// One row per entry: unrestricted rows bare, width-restricted rows fenced.
fn emit_rows<F>(
    code: &mut String, both: &[&CompiledPattern], only32: &[&CompiledPattern], only64: &[&CompiledPattern], row: F,
) -> Result<(), Error>
where
    F: Fn(&CompiledPattern) -> Result<String, Error>,
{
    for &p in both {
        *code += &format!("        {}\n", row(p)?);
    }
    if !only32.is_empty() {
        *code += &format!("        #ifdef {}\n", WIDTH_SYMBOL);
        for &p in only32 {
            *code += &format!("        {}\n", row(p)?);
        }
        code.push_str("        #endif\n");
    }
    if !only64.is_empty() {
        *code += &format!("        #ifndef {}\n", WIDTH_SYMBOL);
        for &p in only64 {
            *code += &format!("        {}\n", row(p)?);
        }
        code.push_str("        #endif\n");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse::Parser;
    use super::table;
    use super::*;

    fn tables_for(driver: Driver, text: &str) -> Vec<DecodeTable> {
        table::build(Parser::new(driver).parse(text).unwrap()).unwrap()
    }

    /// a group of `n` fully-fixed 8-bit patterns sharing one mask
    fn uniform_bucket(n: usize) -> Vec<DecodeTable> {
        let text = (0..n)
            .map(|i| format!("INSTPAT(\"{:08b}\", op{});\n", i, i))
            .collect::<String>();
        tables_for(Driver::Direct, &text)
    }

    const RV_SAMPLE: &str = "\
INSTPAT(\"0000000 ????? ????? 000 ????? 01100 11\", add);
INSTPAT(\"??????? ????? ????? 000 ????? 00100 11\", addi);
";

    #[test]
    fn direct_fragment_is_exact() -> Result<(), Error> {
        let tables = tables_for(Driver::Direct, RV_SAMPLE);
        let code = Emitter::new(Driver::Direct).emit(&tables)?;
        let expected = "\
#ifdef EMU_WORD32
    #define __INST32(x) x
    #define __INST64(x)
#else
    #define __INST32(x)
    #define __INST64(x) x
#endif
{
    switch (inst & 0xfe00707f) {
        case 0x33: this->exec_add(); return true;
    }
}

{
    switch (inst & 0x707f) {
        case 0x13: this->exec_addi(); return true;
    }
}


return false;

#undef __INST32
#undef __INST64
";
        assert_eq!(code, expected);
        Ok(())
    }

    #[test]
    fn regeneration_is_byte_identical() -> Result<(), Error> {
        let a = Emitter::new(Driver::Direct).emit(&tables_for(Driver::Direct, RV_SAMPLE))?;
        let b = Emitter::new(Driver::Direct).emit(&tables_for(Driver::Direct, RV_SAMPLE))?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn two_step_actions_and_sentinel() -> Result<(), Error> {
        let tables = tables_for(Driver::TwoStep, "INSTPAT(\"0110011\", add, r);\n");
        let mut emitter = Emitter::new(Driver::TwoStep);
        emitter.class = String::from("RVCore");
        let code = emitter.emit(&tables)?;
        assert!(code.contains(
            "case 0x33: this->decode_shape_r(); this->exec_add(this->decode_info); return &RVCore::exec_add;"
        ));
        assert!(code.contains("\nreturn nullptr;\n"));
        assert!(code.contains("#define __DECODE32(x) x"));
        assert!(code.contains("#undef __DECODE64"));
        Ok(())
    }

    #[test]
    fn template_substitution() -> Result<(), Error> {
        let tables = tables_for(Driver::Template, "INSTPAT(\"0110011\", add, r);\n");
        let mut emitter = Emitter::new(Driver::Template);
        emitter.format = Some(String::from("do_{name}<{shape}>(inst); return true;"));
        let code = emitter.emit(&tables)?;
        assert!(code.contains("case 0x33: do_add<r>(inst); return true;"));
        Ok(())
    }

    #[test]
    fn template_requires_format() {
        let tables = tables_for(Driver::Template, "INSTPAT(\"0110011\", add, r);\n");
        let e = Emitter::new(Driver::Template).emit(&tables).unwrap_err();
        assert_eq!(e.kind, ErrorKind::General);
    }

    #[test]
    fn width_guards_wrap_restricted_entries() -> Result<(), Error> {
        let text = "INSTPAT(\"0?1\", w32, 32);\nINSTPAT(\"0?0\", w64, 64);\nINSTPAT(\"1?1\", wboth);\n";
        let code = Emitter::new(Driver::Direct).emit(&tables_for(Driver::Direct, text))?;
        assert!(code.contains("__INST32(case 0x1: this->exec_w32(); return true;)"));
        assert!(code.contains("__INST64(case 0x0: this->exec_w64(); return true;)"));
        assert!(code.contains("\n        case 0x5: this->exec_wboth(); return true;\n"));
        // the restricted entries never appear unguarded
        assert!(!code.contains("\n        case 0x1: this->exec_w32"));
        assert!(!code.contains("\n        case 0x0: this->exec_w64"));
        Ok(())
    }

    #[test]
    fn threshold_picks_the_strategy() -> Result<(), Error> {
        let mut emitter = Emitter::new(Driver::Direct);
        emitter.vector = true;
        let code = emitter.emit(&uniform_bucket(31))?;
        assert!(code.contains("switch (inst & 0xff)"));
        assert!(!code.contains("_mm256_cmpeq_epi32"));
        let code = emitter.emit(&uniform_bucket(32))?;
        assert!(code.contains("_mm256_cmpeq_epi32"));
        assert!(code.contains("alignas(64) static constexpr uint32_t keys[]"));
        assert!(!code.contains("switch (inst & 0xff)"));
        Ok(())
    }

    #[test]
    fn vector_is_off_by_default() -> Result<(), Error> {
        let code = Emitter::new(Driver::Direct).emit(&uniform_bucket(40))?;
        assert!(code.contains("switch (inst & 0xff)"));
        assert!(!code.contains("_mm256_cmpeq_epi32"));
        Ok(())
    }

    #[test]
    fn template_driver_never_vectorizes() -> Result<(), Error> {
        let text = (0..40)
            .map(|i| format!("INSTPAT(\"{:08b}\", op{}, s);\n", i, i))
            .collect::<String>();
        let tables = tables_for(Driver::Template, &text);
        let mut emitter = Emitter::new(Driver::Template);
        emitter.format = Some(String::from("do_{name}(); return true;"));
        emitter.vector = true;
        let code = emitter.emit(&tables)?;
        assert!(!code.contains("_mm256_cmpeq_epi32"));
        Ok(())
    }

    #[test]
    fn vector_rows_stay_width_fenced() -> Result<(), Error> {
        let text = (0..30)
            .map(|i| format!("INSTPAT(\"{:08b}\", op{}, r);\n", i, i))
            .chain([
                String::from("INSTPAT(\"11111110\", wide_op, d, 64);\n"),
                String::from("INSTPAT(\"11111111\", narrow_op, r, 32);\n"),
            ])
            .collect::<String>();
        let tables = tables_for(Driver::TwoStep, &text);
        let mut emitter = Emitter::new(Driver::TwoStep);
        emitter.vector = true;
        let code = emitter.emit(&tables)?;
        assert!(code.contains("        #ifdef EMU_WORD32\n        0xff,\n        #endif\n"));
        assert!(code.contains("        #ifndef EMU_WORD32\n        0xfe,\n        #endif\n"));
        assert!(code.contains("&Core::decode_shape_d,"));
        assert!(code.contains("return exec_fns[index];"));
        Ok(())
    }
}
