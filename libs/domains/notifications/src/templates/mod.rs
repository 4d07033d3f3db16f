//! Handlebars templates for account emails.

use crate::error::{NotificationError, NotificationResult};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Data shared by the activation and password-reset templates.
#[derive(Debug, Clone, Serialize)]
pub struct AccountEmailData {
    pub email: String,
    pub token: String,
    pub link: String,
}

pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> NotificationResult<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);

        let templates = [
            ("activation_html", ACTIVATION_HTML_TEMPLATE),
            ("activation_text", ACTIVATION_TEXT_TEMPLATE),
            ("password_reset_html", PASSWORD_RESET_HTML_TEMPLATE),
            ("password_reset_text", PASSWORD_RESET_TEXT_TEMPLATE),
        ];
        for (name, source) in templates {
            handlebars
                .register_template_string(name, source)
                .map_err(|e| NotificationError::TemplateError(format!("Failed to register {name}: {e}")))?;
        }

        Ok(Self { handlebars })
    }

    pub fn render_activation(&self, data: &AccountEmailData) -> NotificationResult<RenderedEmail> {
        debug!(to = %data.email, "Rendering activation email");

        Ok(RenderedEmail {
            subject: "Account Activation".to_string(),
            html: self.handlebars.render("activation_html", data)?,
            text: self.handlebars.render("activation_text", data)?,
        })
    }

    pub fn render_password_reset(&self, data: &AccountEmailData) -> NotificationResult<RenderedEmail> {
        debug!(to = %data.email, "Rendering password reset email");

        Ok(RenderedEmail {
            subject: "Password Reset".to_string(),
            html: self.handlebars.render("password_reset_html", data)?,
            text: self.handlebars.render("password_reset_text", data)?,
        })
    }
}

const ACTIVATION_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>Account Activation</title>
</head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background-color: #f4f4f5; padding: 40px 20px;">
  <table role="presentation" width="100%" cellspacing="0" cellpadding="0" style="max-width: 600px; margin: 0 auto; background-color: #ffffff; border-radius: 8px; padding: 40px;">
    <tr>
      <td>
        <h1 style="color: #18181b; font-size: 22px; margin: 0 0 16px 0;">Activate your account</h1>
        <p style="color: #52525b; font-size: 16px; line-height: 24px;">
          An account was created for <strong>{{email}}</strong>. Click the button below to activate it.
        </p>
        <p style="text-align: center; margin: 32px 0;">
          <a href="{{link}}" style="background-color: #2563eb; color: #ffffff; padding: 12px 32px; text-decoration: none; border-radius: 6px;">Activate Account</a>
        </p>
        <p style="color: #71717a; font-size: 12px;">Activation token: {{token}}</p>
      </td>
    </tr>
  </table>
</body>
</html>"#;

const ACTIVATION_TEXT_TEMPLATE: &str = r#"Activate your account

An account was created for {{email}}.

Open the link below to activate it:
{{link}}

Activation token: {{token}}"#;

const PASSWORD_RESET_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>Password Reset</title>
</head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background-color: #f4f4f5; padding: 40px 20px;">
  <table role="presentation" width="100%" cellspacing="0" cellpadding="0" style="max-width: 600px; margin: 0 auto; background-color: #ffffff; border-radius: 8px; padding: 40px;">
    <tr>
      <td>
        <h1 style="color: #18181b; font-size: 22px; margin: 0 0 16px 0;">Reset your password</h1>
        <p style="color: #52525b; font-size: 16px; line-height: 24px;">
          A password reset was requested for <strong>{{email}}</strong>.
        </p>
        <p style="text-align: center; margin: 32px 0;">
          <a href="{{link}}" style="background-color: #dc2626; color: #ffffff; padding: 12px 32px; text-decoration: none; border-radius: 6px;">Reset Password</a>
        </p>
        <p style="color: #71717a; font-size: 12px;">Reset token: {{token}}</p>
        <p style="color: #71717a; font-size: 12px;">If you did not request this, you can ignore this email.</p>
      </td>
    </tr>
  </table>
</body>
</html>"#;

const PASSWORD_RESET_TEXT_TEMPLATE: &str = r#"Reset your password

A password reset was requested for {{email}}.

Open the link below to choose a new password:
{{link}}

Reset token: {{token}}

If you did not request this, you can ignore this email."#;
