#![allow(unused_macros, dead_code)]
macro_rules! verbose_println {
    ($($p:expr),+) => {
        if (config::ARGS.verbose) {
            println!($($p),+);
        }
    }
}
macro_rules! info {
    ($($p:expr),+) => {
        println!(concat!(blue!("INFO"),": {}"),format_args!($($p),+))
    }
}

macro_rules! warn {
    ($($p:expr),+) => {
        println!(concat!(red!("WARNING"),": {}"),format_args!($($p),+))
    }
}
macro_rules! general_err {
    ($msg:expr) => {
        Error::new(crate::ErrorKind::General, None, format!("{}", $msg).as_str())
    };
}

macro_rules! syntax_err_line {
    ($line:expr, $src:expr, $msg:expr) => {
        Error::new(
            ErrorKind::Syntax,
            Some($src.to_string()),
            format!("{}, line {}: {}", red!("Syntax Error"), $line, $msg).as_str(),
        )
    };
}
macro_rules! width_err_line {
    ($line:expr, $src:expr, $msg:expr) => {
        Error::new(
            ErrorKind::Width,
            Some($src.to_string()),
            format!("{}, line {}: {}", red!("Width Error"), $line, $msg).as_str(),
        )
    };
}
macro_rules! pattern_err {
    ($msg:expr) => {
        Error::new(
            crate::ErrorKind::Pattern,
            None,
            format!("{} {}", red!("Pattern Error"), $msg).as_str(),
        )
    };
}
macro_rules! conflict_err {
    ($msg:expr) => {
        Error::new(
            crate::ErrorKind::Conflict,
            None,
            format!("{} {}", red!("Conflict Error"), $msg).as_str(),
        )
    };
}
macro_rules! color {
    ($color: literal, $msg: expr) => {
        concat!("\x1b[", $color, "m", $msg, "\x1b[0m")
    };
}
macro_rules! red {
    ($msg:expr) => {
        color!(91, $msg)
    };
}
macro_rules! green {
    ($msg:expr) => {
        color!(92, $msg)
    };
}
macro_rules! yellow {
    ($msg:expr) => {
        color!(93, $msg)
    };
}
macro_rules! blue {
    ($msg:expr) => {
        color!(94, $msg)
    };
}
