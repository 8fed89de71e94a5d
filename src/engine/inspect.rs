// Object inspection probe
//
// The probe script's output is a constrained line format the engine controls
// (one "name<TAB>description" line per binding), so parsing never has to
// understand arbitrary R values.

use std::collections::BTreeMap;

/// R code that loads the saved workspace image and emits one line per binding.
pub(crate) fn probe_script(image_relative: &str) -> String {
    format!(
        concat!(
            "load(\"{}\", envir=.GlobalEnv); ",
            "for(n in ls(.GlobalEnv)){{ ",
            "o = get(n, envir=.GlobalEnv); ",
            "cat(n, \"\\t\", class(o)[1], \" len=\", length(o), \"\\n\", sep=\"\") ",
            "}}"
        ),
        escape_r_string(image_relative)
    )
}

/// Parse probe output into a name -> description map. Lines without the
/// separator are ignored; the probe never emits them.
pub(crate) fn parse_probe_output(stdout: &str) -> BTreeMap<String, String> {
    let mut objects = BTreeMap::new();
    for line in stdout.lines() {
        if let Some((name, description)) = line.split_once('\t') {
            let name = name.trim();
            if !name.is_empty() {
                objects.insert(name.to_string(), description.trim().to_string());
            }
        }
    }
    objects
}

/// Escape a string for embedding inside a double-quoted R literal.
pub(crate) fn escape_r_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
