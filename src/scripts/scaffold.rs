// Scaffold template for new R scripts

/// Commented starter content for scaffolded scripts.
///
/// The style rules match what the code-generation side emits: "=" assignment
/// and no space in control statements.
pub const SCRIPT_SCAFFOLD: &str = r#"# rworkd: Primary R Script
# Purpose: Add your analysis functions, data prep, and execution blocks here.
# Style:
# - Use "=" for assignment (not "<-").
# - No space in control statements: if(cond){...}, for(i in xs){...}, while(ok){...}, function(x){...}
# Notes:
# - Keep functions small, documented, and testable.
# - Use explicit library() calls in the "Packages" section.
# - Write outputs (CSV/RDS/plots) into the working directory.

# ---- Packages ----
# library(readr)
# library(dplyr)

# ---- Functions ----
# example_function = function(x){
#   # Add docs about inputs/outputs
#   y = x * 2
#   return(y)
# }

# ---- Main ----
# Uncomment to run:
# result = example_function(21)
# write.csv(data.frame(result=result), "result.csv", row.names=FALSE)

# ---- Session Info ----
# print(sessionInfo())
"#;
