//! Message keys and their English and Vietnamese texts.

use axum_helpers::Locale;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum MessageKey {
    UsernameNull,
    UsernameSize,
    EmailNull,
    EmailInvalid,
    EmailInuse,
    PasswordNull,
    PasswordSize,
    PasswordPattern,
    UserCreateSuccess,
    AccountActivationSuccess,
    AccountActivationFailure,
    EmailFailure,
    ValidationFailure,
    UserNotFound,
    AuthenticationFailure,
    InactiveAuthenticationFailure,
    UnauthorizedUserUpdate,
    LogoutSuccess,
    EmailNotInuse,
    PasswordResetRequestSuccess,
    UnauthorizedPasswordReset,
    PasswordUpdateSuccess,
    ProfileImageSize,
    UnsupportedImageFile,
    InternalError,
}

impl MessageKey {
    pub fn key(self) -> &'static str {
        self.into()
    }

    pub fn text(self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.english(),
            Locale::Vi => self.vietnamese(),
        }
    }

    fn english(self) -> &'static str {
        match self {
            MessageKey::UsernameNull => "Username cannot be null",
            MessageKey::UsernameSize => "Username must have min 4 and max 32 characters",
            MessageKey::EmailNull => "E-mail cannot be null",
            MessageKey::EmailInvalid => "E-mail is not valid",
            MessageKey::EmailInuse => "E-mail in use",
            MessageKey::PasswordNull => "Password cannot be null",
            MessageKey::PasswordSize => "Password must have at least 8 characters",
            MessageKey::PasswordPattern => {
                "Password must have at least 1 uppercase, 1 lowercase letter and 1 number"
            }
            MessageKey::UserCreateSuccess => "User is created",
            MessageKey::AccountActivationSuccess => "Account is activated",
            MessageKey::AccountActivationFailure => "Invalid activation token",
            MessageKey::EmailFailure => "E-mail failure",
            MessageKey::ValidationFailure => "Validation Failure",
            MessageKey::UserNotFound => "User not found",
            MessageKey::AuthenticationFailure => "Incorrect credentials",
            MessageKey::InactiveAuthenticationFailure => "Account is inactive",
            MessageKey::UnauthorizedUserUpdate => "You are not authorized to update user",
            MessageKey::LogoutSuccess => "Logout success",
            MessageKey::EmailNotInuse => "E-mail is not in use",
            MessageKey::PasswordResetRequestSuccess => "Check your e-mail for resetting your password",
            MessageKey::UnauthorizedPasswordReset => "Please click the link in your e-mail to reset your password",
            MessageKey::PasswordUpdateSuccess => "Your password is updated",
            MessageKey::ProfileImageSize => "Your profile image cannot be bigger than 2MB",
            MessageKey::UnsupportedImageFile => "Profile image is not a valid file",
            MessageKey::InternalError => "Internal Server Error",
        }
    }

    fn vietnamese(self) -> &'static str {
        match self {
            MessageKey::UsernameNull => "Tên người dùng không được để trống",
            MessageKey::UsernameSize => "Tên người dùng phải có từ 4 đến 32 ký tự",
            MessageKey::EmailNull => "E-mail không được để trống",
            MessageKey::EmailInvalid => "E-mail không hợp lệ",
            MessageKey::EmailInuse => "E-mail đã được sử dụng",
            MessageKey::PasswordNull => "Mật khẩu không được để trống",
            MessageKey::PasswordSize => "Mật khẩu phải có ít nhất 8 ký tự",
            MessageKey::PasswordPattern => "Mật khẩu phải có ít nhất 1 chữ hoa, 1 chữ thường và 1 chữ số",
            MessageKey::UserCreateSuccess => "Người dùng đã được tạo",
            MessageKey::AccountActivationSuccess => "Tài khoản đã được kích hoạt",
            MessageKey::AccountActivationFailure => "Mã kích hoạt không hợp lệ",
            MessageKey::EmailFailure => "Gửi e-mail thất bại",
            MessageKey::ValidationFailure => "Dữ liệu không hợp lệ",
            MessageKey::UserNotFound => "Không tìm thấy người dùng",
            MessageKey::AuthenticationFailure => "Thông tin đăng nhập không chính xác",
            MessageKey::InactiveAuthenticationFailure => "Tài khoản chưa được kích hoạt",
            MessageKey::UnauthorizedUserUpdate => "Bạn không có quyền cập nhật người dùng này",
            MessageKey::LogoutSuccess => "Đăng xuất thành công",
            MessageKey::EmailNotInuse => "E-mail chưa được sử dụng",
            MessageKey::PasswordResetRequestSuccess => "Kiểm tra e-mail để đặt lại mật khẩu",
            MessageKey::UnauthorizedPasswordReset => "Vui lòng nhấn vào liên kết trong e-mail để đặt lại mật khẩu",
            MessageKey::PasswordUpdateSuccess => "Mật khẩu của bạn đã được cập nhật",
            MessageKey::ProfileImageSize => "Ảnh đại diện không được lớn hơn 2MB",
            MessageKey::UnsupportedImageFile => "Ảnh đại diện không phải là tệp hợp lệ",
            MessageKey::InternalError => "Lỗi máy chủ",
        }
    }
}

/// Catalog lookup for [`axum_helpers::localize_errors`].
pub fn translate(locale: Locale, key: &str) -> Option<&'static str> {
    MessageKey::from_str(key).ok().map(|key| key.text(locale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn keys_are_snake_case() {
        assert_eq!(MessageKey::EmailNotInuse.key(), "email_not_inuse");
        assert_eq!(MessageKey::UnauthorizedPasswordReset.key(), "unauthorized_password_reset");
        assert_eq!(MessageKey::ValidationFailure.key(), axum_helpers::VALIDATION_FAILURE);
    }

    #[test]
    fn translate_round_trips_every_key() {
        for key in MessageKey::iter() {
            assert_eq!(translate(Locale::En, key.key()), Some(key.text(Locale::En)));
            assert_eq!(translate(Locale::Vi, key.key()), Some(key.text(Locale::Vi)));
        }
    }

    #[test]
    fn locales_have_distinct_texts() {
        for key in MessageKey::iter() {
            assert_ne!(key.text(Locale::En), key.text(Locale::Vi), "{key}");
        }
    }

    #[test]
    fn unknown_key_is_not_translated() {
        assert_eq!(translate(Locale::En, "no_such_key"), None);
    }
}
