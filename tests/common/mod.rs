#![allow(dead_code)]

use std::error::Error;

pub use screenrun_test_utils::init_tracing;

pub type TestResult = Result<(), Box<dyn Error>>;

/// The network screen used across several tests.
pub const NET_PLUGIN: &str = "@-\nscreen_name=\"Net\"\n$\nip a\n$\n-@";

/// A table screen with a header row and one command block for its rows.
pub const DISK_TABLE_PLUGIN: &str = r#"@-
display-mode="1"
screen_name="Disks"
table_columns=Filesystem, Size, Used
$
df -h | tail -n +2
$
-@
"#;

/// Two screens: text with two blocks, then a screen without commands.
pub const MIXED_PLUGIN: &str = r#"@-
screen_name="System"
Kernel:
$
uname -r
$
Uptime:
$
uptime
$
-@
@-
screen_name="Notes"
static line
-@
"#;
