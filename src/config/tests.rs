//! Unit tests for `Config::from_env`.
//! These tests modify process environment variables, so they serialize on `ENV_LOCK`.

use super::*;
use std::env;
use std::sync::Mutex;
use once_cell::sync::Lazy;

// Static Mutex to ensure tests modifying environment variables run serially.
static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

const VARS: &[&str] = &[
    "CONTACT_RELAY_BIND_ADDRESS",
    "CONTACT_RELAY_PORT",
    "CONTACT_RELAY_LOG_DIR",
    "CONTACT_RELAY_STATIC_DIR",
    "CONTACT_RELAY_MAIL_ADAPTER",
    "CONTACT_RELAY_SMTP_HOST",
    "CONTACT_RELAY_SMTP_PORT",
    "CONTACT_RELAY_EMAIL_USER",
    "CONTACT_RELAY_EMAIL_PASS",
    "CONTACT_RELAY_RECIPIENT_EMAIL",
];

fn clear_test_env_vars() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
fn test_config_default_values() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_test_env_vars();

    let config = Config::from_env().expect("defaults alone should load");

    assert_eq!(config.bind_address, "0.0.0.0");
    assert_eq!(config.port, 3000);
    assert_eq!(config.log_dir, "logs");
    assert_eq!(config.static_dir, ".");
    assert_eq!(config.mail_adapter, MailAdapter::Smtp);
    assert_eq!(config.smtp_host, "smtp.gmail.com");
    assert_eq!(config.smtp_port, 587);
    // Missing credentials are not a load error
    assert!(config.email_user.is_none());
    assert!(config.email_pass.is_none());
    assert!(config.recipient_email.is_none());
}

#[test]
fn test_config_from_env_all_set() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_test_env_vars();

    env::set_var("CONTACT_RELAY_BIND_ADDRESS", "127.0.0.1");
    env::set_var("CONTACT_RELAY_PORT", "8081");
    env::set_var("CONTACT_RELAY_LOG_DIR", "/var/log/contact");
    env::set_var("CONTACT_RELAY_STATIC_DIR", "public");
    env::set_var("CONTACT_RELAY_MAIL_ADAPTER", "Console");
    env::set_var("CONTACT_RELAY_SMTP_HOST", "mail.example.com");
    env::set_var("CONTACT_RELAY_SMTP_PORT", "2525");
    env::set_var("CONTACT_RELAY_EMAIL_USER", "relay@example.com");
    env::set_var("CONTACT_RELAY_EMAIL_PASS", "hunter2");
    env::set_var("CONTACT_RELAY_RECIPIENT_EMAIL", "owner@example.com");

    let config = Config::from_env().expect("Config loading failed when all vars were set");

    assert_eq!(config.listen_addr(), "127.0.0.1:8081");
    assert_eq!(config.log_dir, "/var/log/contact");
    assert_eq!(config.static_dir, "public");
    assert_eq!(config.mail_adapter, MailAdapter::Console);
    assert_eq!(config.smtp_host, "mail.example.com");
    assert_eq!(config.smtp_port, 2525);
    assert_eq!(config.email_user.as_deref(), Some("relay@example.com"));
    assert_eq!(config.email_pass.as_deref(), Some("hunter2"));
    assert_eq!(config.recipient_email.as_deref(), Some("owner@example.com"));

    clear_test_env_vars();
}

#[test]
fn test_config_invalid_ports() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_test_env_vars();

    env::set_var("CONTACT_RELAY_PORT", "not-a-port");
    match Config::from_env() {
        Err(e) => {
            let err_msg = e.to_string();
            assert!(err_msg.contains("CONTACT_RELAY_PORT"));
            assert!(err_msg.contains("not-a-port"));
        }
        Ok(_) => panic!("Expected an error for invalid CONTACT_RELAY_PORT, but got Ok"),
    }

    env::set_var("CONTACT_RELAY_PORT", "3000");
    env::set_var("CONTACT_RELAY_SMTP_PORT", "70000");
    match Config::from_env() {
        Err(e) => {
            let err_msg = e.to_string();
            assert!(err_msg.contains("CONTACT_RELAY_SMTP_PORT"));
            assert!(err_msg.contains("70000"));
        }
        Ok(_) => panic!("Expected an error for out-of-range CONTACT_RELAY_SMTP_PORT, but got Ok"),
    }

    clear_test_env_vars();
}

#[test]
fn test_config_unknown_adapter() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_test_env_vars();

    env::set_var("CONTACT_RELAY_MAIL_ADAPTER", "carrier-pigeon");
    let err = Config::from_env().expect_err("unknown adapter must be rejected");
    assert!(err.to_string().contains("carrier-pigeon"));

    clear_test_env_vars();
}

#[test]
fn test_blank_optional_values_count_as_missing() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_test_env_vars();

    env::set_var("CONTACT_RELAY_RECIPIENT_EMAIL", "   ");
    let config = Config::from_env().expect("blank optional values should load");
    assert!(config.recipient_email.is_none());

    clear_test_env_vars();
}

#[test]
fn test_debug_output_redacts_password() {
    let mut config = Config::for_tests("logs");
    config.email_pass = Some("super-secret".to_string());

    let rendered = format!("{:?}", config);
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("<redacted>"));
}
