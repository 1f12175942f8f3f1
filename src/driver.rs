use clap::ValueEnum;

/// The three dispatch conventions the generator can emit. They share the
/// parser, the pattern compiler and the table builder; what differs is the
/// action emitted per matched entry and the value that signals "dispatched".
#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
pub enum Driver {
    /// one execution call per instruction; the fragment reports a boolean success flag
    Direct,
    /// shared operand extraction, then execution; the fragment returns the execution handle
    TwoStep,
    /// caller-supplied action template with {name}/{shape} substitution points
    Template,
}

impl Driver {
    /// true if the invocation shape carries a decode-shape argument
    pub fn takes_shape(&self) -> bool { !matches!(self, Driver::Direct) }

    /// width-guard helper macros defined at the top of the fragment
    pub fn guard_macros(&self) -> (&'static str, &'static str) {
        match self {
            Driver::TwoStep => ("__DECODE32", "__DECODE64"),
            _ => ("__INST32", "__INST64"),
        }
    }

    /// emitted once after every table has fallen through with no match
    pub fn sentinel(&self) -> &'static str {
        match self {
            Driver::TwoStep => "return nullptr;",
            _ => "return false;",
        }
    }

    /// free-form template actions cannot be tabulated into aligned arrays
    pub fn has_vector_form(&self) -> bool { !matches!(self, Driver::Template) }
}
