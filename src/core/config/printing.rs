use crate::core::config::data::Config;

impl Config {
    pub fn print_all(&self) {
        let settings = self.backend_settings();
        println!("Current configuration:");
        print_entry("backend-name", self.backend_name.is_some(), &settings.backend_name);
        print_entry("base-url", self.base_url.is_some(), &settings.base_url);
        print_entry("model", self.model.is_some(), &settings.model);
        print_entry(
            "max-tokens",
            self.max_tokens.is_some(),
            &settings.max_tokens.to_string(),
        );
        print_entry(
            "temperature",
            self.temperature.is_some(),
            &settings.temperature.to_string(),
        );
        print_entry(
            "context-window",
            self.context_window.is_some(),
            &settings.context_window.to_string(),
        );
        print_entry(
            "timeout-secs",
            self.timeout_secs.is_some(),
            &settings.timeout_secs.to_string(),
        );
        print_entry("greeting", self.greeting.is_some(), self.greeting());
        print_entry(
            "credential-name",
            self.credential_name.is_some(),
            self.credential_name(),
        );
    }
}

fn print_entry(key: &str, is_set: bool, value: &str) {
    if is_set {
        println!("  {key}: {value}");
    } else {
        println!("  {key}: {value} (default)");
    }
}
