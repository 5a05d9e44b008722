#[derive(Serialize, Debug, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Error {
    IncorrectData {
        with: &'static str,
    },
    DatabaseError {
        operation: &'static str,
        with: &'static str,
    },
    InternalError,
    OperationFailed,

    InvalidSession,
    Forbidden,
    UnknownUser,
    UnknownAppointment,
    UnknownListing,

    EmailInUse,
    InvalidCode,
    EmailFailed,
    InvalidCredentials,
    MissingSecret,
    ShortSecret,

    NotDoctor,
    ListingLocked,
    UnlistedDoctor,

    IllegalTransition,
    OutsideBookingWindow,
    AttachmentTooLarge,
    UnsupportedAttachment,
    UploadFailed,
}

impl Error {
    /// Stable human-readable message, safe to show across the boundary
    pub fn description(&self) -> &'static str {
        match self {
            Error::IncorrectData { .. } => "A provided field is missing or malformed.",
            Error::DatabaseError { .. } => "The data store is currently unavailable.",
            Error::InternalError => "An internal error occurred.",
            Error::OperationFailed => "This operation could not be performed.",

            Error::InvalidSession => "Session token is missing, unknown or expired.",
            Error::Forbidden => "You are not allowed to perform this action.",
            Error::UnknownUser => "No such account.",
            Error::UnknownAppointment => "No such appointment.",
            Error::UnknownListing => "No such listing.",

            Error::EmailInUse => "This email address is already registered.",
            Error::InvalidCode => "Invalid or expired verification code.",
            Error::EmailFailed => "Failed to deliver the email.",
            Error::InvalidCredentials => "Invalid email or password.",
            Error::MissingSecret => "A password is required for this role.",
            Error::ShortSecret => "Password must be at least 6 characters.",

            Error::NotDoctor => "Only doctors may perform this action.",
            Error::ListingLocked => "Listing has already been accepted and cannot be resubmitted.",
            Error::UnlistedDoctor => "Invalid or unlisted doctor.",

            Error::IllegalTransition => "The appointment cannot change state this way.",
            Error::OutsideBookingWindow => "Date must fall within the booking window.",
            Error::AttachmentTooLarge => "Attachment exceeds the size limit.",
            Error::UnsupportedAttachment => "Attachment must be a JPEG or PNG image.",
            Error::UploadFailed => "Failed to store the attachment.",
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
pub type Success = Result<()>;
