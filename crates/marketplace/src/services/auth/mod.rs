//! Phone OTP authentication.
//!
//! There is no real OTP delivery: sending waits for a configured delay and
//! the only accepted code is [`MOCK_OTP`]. Verification logs the phone into
//! the session store.

mod error;

pub use error::AuthError;

use tracing::instrument;

use farm_connect_core::PhoneNumber;

use crate::config::DelayConfig;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{Notice, User};
use crate::route::Route;
use crate::state::AppSession;

/// The one code the mock OTP check accepts.
pub const MOCK_OTP: &str = "123456";

/// Length of a one-time code.
pub const OTP_LENGTH: usize = 6;

/// Which login page flow the user is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthFlow {
    /// Existing, registered users.
    #[default]
    Login,
    /// New users verifying their phone before completing a profile.
    Signup,
}

/// An OTP that has been "sent" to a phone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    pub phone: PhoneNumber,
    pub flow: AuthFlow,
    pub notice: Notice,
}

/// Result of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRedirect {
    pub user: User,
    pub route: Route,
    pub notice: Notice,
}

/// Authentication service.
pub struct AuthService<'a> {
    session: &'a AppSession,
    delays: DelayConfig,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(session: &'a AppSession, delays: DelayConfig) -> Self {
        Self { session, delays }
    }

    /// Validate the phone number and send a (mock) OTP.
    ///
    /// The login flow only proceeds when the stored profile belongs to this
    /// phone and has a role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidPhone` if the phone is not 10-15 digits.
    /// Returns `AuthError::NotRegistered` for a login without a completed profile.
    #[instrument(skip(self, phone_input))]
    pub async fn request_otp(
        &self,
        phone_input: &str,
        flow: AuthFlow,
    ) -> Result<OtpChallenge, AuthError> {
        let phone = PhoneNumber::parse(phone_input)?;

        let notice = match flow {
            AuthFlow::Signup => {
                tokio::time::sleep(self.delays.otp_send).await;
                Notice::info(
                    "OTP Sent for Signup",
                    format!("An OTP has been sent to your phone (mock: {MOCK_OTP})."),
                )
            }
            AuthFlow::Login => {
                let registered = self
                    .session
                    .stored_user()
                    .is_some_and(|user| user.phone_number == phone && user.is_registered());

                tokio::time::sleep(self.delays.login_check).await;

                if !registered {
                    tracing::info!(phone = %phone, "Login attempted for unregistered phone");
                    return Err(AuthError::NotRegistered);
                }
                Notice::info(
                    "OTP Sent",
                    format!("An OTP has been sent to your phone (mock: {MOCK_OTP})."),
                )
            }
        };

        Ok(OtpChallenge {
            phone,
            flow,
            notice,
        })
    }

    /// Check the code and log the phone in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidOtp` if the code is wrong.
    /// Returns `AuthError::Session` if the session could not be saved.
    #[instrument(skip(self, challenge, code), fields(phone = %challenge.phone))]
    pub fn verify_otp(&self, challenge: &OtpChallenge, code: &str) -> Result<AuthRedirect, AuthError> {
        let code = code.trim();
        if code.chars().count() != OTP_LENGTH || code != MOCK_OTP {
            return Err(AuthError::InvalidOtp);
        }

        let user = self.session.login(&challenge.phone)?;
        set_sentry_user(&user.id);

        let (route, notice) = match (challenge.flow, user.role) {
            (AuthFlow::Signup, Some(role)) => (
                Route::home_for(Some(role)),
                Notice::info(
                    "Already Registered",
                    "You are already registered. Logging you in.",
                ),
            ),
            (AuthFlow::Signup, None) => (
                Route::Signup,
                Notice::info(
                    "Phone Verified",
                    "Please complete your profile to sign up.",
                ),
            ),
            (AuthFlow::Login, role) => (
                Route::home_for(role),
                Notice::info("Login Successful", "Redirecting..."),
            ),
        };

        Ok(AuthRedirect {
            user,
            route,
            notice,
        })
    }

    /// End the session. The stored profile is kept for the next login.
    pub fn logout(&self) -> Route {
        self.session.logout();
        clear_sentry_user();
        Route::Home
    }
}
