//! Testing utilities for startup-rca workspace
//!
//! Shared log fixtures, a log line builder and match result shortcuts.

#![allow(missing_docs)]

use rca_model::{CausalRole, Category, LogEvent, MatchResult, Severity};

pub mod fixtures {
    /// Two files declaring the same mod id, then a loader abort
    pub const FORGE_DUPLICATE_MOD: &str = "\
[18Oct2026 10:00:00.100] [main/INFO] [cpw.mods.modlauncher.Launcher/MODLAUNCHER]: ModLauncher running: args [--launchTarget, forgeclient]
[18Oct2026 10:00:00.500] [main/INFO] [net.minecraftforge.fml.loading.moddiscovery.ModDiscoverer/SCAN]: Scanning for mod candidates
[18Oct2026 10:00:01.000] [main/DEBUG] [net.minecraftforge.fml.loading.moddiscovery.ModFile/LOADING]: Found valid mod file rubidium-0.7.1.jar with {rubidium} mods - versions {0.7.1}
[18Oct2026 10:00:01.100] [main/DEBUG] [net.minecraftforge.fml.loading.moddiscovery.ModFile/LOADING]: Found valid mod file embeddium-0.3.18.jar with {rubidium} mods - versions {0.3.18}
[18Oct2026 10:00:01.200] [main/DEBUG] [net.minecraftforge.fml.loading.moddiscovery.ModFile/LOADING]: Found valid mod file jei-15.2.0.27.jar with {jei} mods - versions {15.2.0.27}
[18Oct2026 10:00:02.000] [main/ERROR] [net.minecraftforge.fml.loading.ModSorter/LOADING]: Found duplicate mods:
\tMod ID: 'rubidium' from mod files: embeddium-0.3.18.jar, rubidium-0.7.1.jar
[18Oct2026 10:00:02.100] [main/FATAL] [net.minecraftforge.fml.loading.FMLLoader/]: Loading errors encountered, aborting mod loading
";

    /// A single low-severity descriptor complaint, no failure
    pub const MISSING_METADATA_ONLY: &str = "\
[10:00:00] [main/INFO]: Loading Minecraft 1.20.1 with Fabric Loader 0.15.3
[10:00:01] [main/WARN]: Mod file shaderpack.jar is missing fabric.mod.json
";

    /// Itemized missing dependencies followed by an abort
    pub const FORGE_MISSING_DEPENDENCY: &str = "\
[18Oct2026 11:00:00.000] [main/INFO] [net.minecraftforge.fml.loading.moddiscovery.ModDiscoverer/SCAN]: Scanning for mod candidates
[18Oct2026 11:00:01.000] [main/DEBUG] [net.minecraftforge.fml.loading.moddiscovery.ModFile/LOADING]: Found valid mod file mowziesmobs-1.6.3.jar with {mowziesmobs} mods - versions {1.6.3}
[18Oct2026 11:00:02.000] [main/ERROR] [net.minecraftforge.fml.loading.ModSorter/LOADING]: Missing or unsupported mandatory dependencies:
\tMod ID: 'geckolib', Requested by: 'mowziesmobs', Expected range: '[4.2,)', Actual version: '[MISSING]'
[18Oct2026 11:00:02.100] [main/FATAL] [net.minecraftforge.fml.loading.FMLLoader/]: Loading errors encountered, aborting mod loading
";

    /// Abort during the scan with nothing logged at ERROR beforehand
    pub const SILENT_ABORT: &str = "\
[18Oct2026 12:00:00.000] [main/INFO] [net.minecraftforge.fml.loading.moddiscovery.ModDiscoverer/SCAN]: Scanning for mod candidates
[18Oct2026 12:00:01.000] [main/DEBUG] [net.minecraftforge.fml.loading.moddiscovery.ModFile/LOADING]: Found valid mod file create-0.5.1.jar with {create} mods - versions {0.5.1}
[18Oct2026 12:00:02.000] [main/FATAL] [net.minecraftforge.fml.loading.FMLLoader/]: Loading errors encountered, aborting mod loading
";

    /// Runtime exception in `latest.log` format ending in a crash
    pub const EXCEPTION_CRASH: &str = "\
[12:00:00] [main/INFO]: Loading 3 mods:
[12:00:05] [Render thread/ERROR]: Failed to create mod instance: java.lang.NoSuchMethodError: 'long org.lwjgl.system.MemoryUtil.getPointer()'
\tat me.jellysquid.mods.sodium.client.SodiumClientMod.<init>(SodiumClientMod.java:42)
[12:00:06] [Render thread/FATAL]: Game crashed! Crash report saved to: #@!@# ./crash-reports/crash-2026-10-18.txt
";

    /// No recognizable startup pattern at all
    pub const NOISE: &str = "\
---- Minecraft Crash Report ----
// Who set us up the TNT?
random words without header
";
}

/// Parse fixture text into events
#[must_use]
pub fn events(text: &str) -> Vec<LogEvent> {
    rca_parser::parse_log(text).events
}

/// Match result over `events` with one evidence string per event
#[must_use]
pub fn result(category: &str, severity: Severity, role: CausalRole, events: &[usize]) -> MatchResult {
    let mut result = MatchResult::new(
        Category::new(category),
        severity,
        role,
        format!("{category} detected"),
    )
    .with_events(events.iter().copied());
    for seq in events {
        result = result.with_evidence(format!("{category} at line {seq}"));
    }
    result
}

/// Builder for loader debug log lines with increasing timestamps
#[derive(Debug, Default)]
pub struct LogBuilder {
    lines: Vec<String>,
    clock: u32,
}

impl LogBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn line(mut self, level: &str, logger: &str, message: &str) -> Self {
        let (h, m, s) = (10 + self.clock / 3600, (self.clock / 60) % 60, self.clock % 60);
        self.lines
            .push(format!("[{h:02}:{m:02}:{s:02}] [main/{level}] [{logger}]: {message}"));
        self.clock += 1;
        self
    }

    #[must_use]
    pub fn info(self, logger: &str, message: &str) -> Self {
        self.line("INFO", logger, message)
    }

    #[must_use]
    pub fn debug(self, logger: &str, message: &str) -> Self {
        self.line("DEBUG", logger, message)
    }

    #[must_use]
    pub fn warn(self, logger: &str, message: &str) -> Self {
        self.line("WARN", logger, message)
    }

    #[must_use]
    pub fn error(self, logger: &str, message: &str) -> Self {
        self.line("ERROR", logger, message)
    }

    #[must_use]
    pub fn fatal(self, logger: &str, message: &str) -> Self {
        self.line("FATAL", logger, message)
    }

    /// Append a line verbatim
    #[must_use]
    pub fn raw(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    /// Declaration line for `mod_id` in `file`
    #[must_use]
    pub fn mod_file(self, file: &str, mod_id: &str, version: &str) -> Self {
        self.debug(
            "ModFile/LOADING",
            &format!("Found valid mod file {file} with {{{mod_id}}} mods - versions {{{version}}}"),
        )
    }

    #[must_use]
    pub fn build(self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}
