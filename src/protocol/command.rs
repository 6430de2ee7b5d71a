#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    SettingsLoad,
    SettingsSave,
    Scan,
    Select,
    Translate,
    Plan,
    Rename,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "settings.load" => Command::SettingsLoad,
            "settings.save" => Command::SettingsSave,
            "scan" => Command::Scan,
            "select" => Command::Select,
            "translate" => Command::Translate,
            "plan" => Command::Plan,
            "rename" => Command::Rename,
            _ => Command::Unknown,
        }
    }
}
