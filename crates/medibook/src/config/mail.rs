use crate::models::AppointmentStatus;

/// Email template
///
/// Bodies are rendered with handlebars; `{{code}}`, `{{patient_name}}`,
/// `{{doctor_name}}`, `{{date}}`, `{{time}}` and friends are filled from
/// the dispatching operation.
#[derive(Serialize, Deserialize, Clone)]
pub struct Template {
    /// Title of the email
    pub title: String,
    /// Plain text version of this email
    pub text: String,
    /// HTML version of this email
    pub html: Option<String>,
}

/// Email templates
#[derive(Serialize, Deserialize, Clone)]
pub struct Templates {
    /// Template for one-time verification codes
    pub verification: Template,
    /// Template for the post-registration welcome email
    ///
    /// Unlike the others, this one is optional.
    pub welcome: Option<Template>,
    /// Template for a freshly booked appointment
    pub booked: Template,
    /// Template for a confirmed appointment
    pub confirmed: Template,
    /// Template for a rejected appointment
    pub rejected: Template,
    /// Template for a rescheduled appointment
    pub rescheduled: Template,
    /// Template for a cancelled appointment
    pub cancelled: Template,
}

impl Templates {
    /// Template describing the given lifecycle status
    pub fn for_status(&self, status: AppointmentStatus) -> &Template {
        match status {
            AppointmentStatus::Pending => &self.booked,
            AppointmentStatus::Confirmed => &self.confirmed,
            AppointmentStatus::Rejected => &self.rejected,
            AppointmentStatus::Rescheduled => &self.rescheduled,
            AppointmentStatus::Cancelled => &self.cancelled,
        }
    }
}

impl Default for Templates {
    fn default() -> Templates {
        Templates {
            verification: Template {
                title: "Your verification code".into(),
                text: "Your verification code is {{code}}. It is valid for 5 minutes.".into(),
                html: None,
            },
            welcome: Some(Template {
                title: "Welcome to the clinic".into(),
                text: "Hello {{name}},\n\nYour registration as a {{role}} was successful."
                    .into(),
                html: None,
            }),
            booked: Template {
                title: "Appointment booked".into(),
                text: "An appointment between {{patient_name}} and Dr. {{doctor_name}} \
                       ({{doctor_speciality}}) has been booked for {{date}} at {{time}}."
                    .into(),
                html: None,
            },
            confirmed: Template {
                title: "Appointment confirmed".into(),
                text: "The appointment between {{patient_name}} and Dr. {{doctor_name}} \
                       on {{date}} at {{time}} has been confirmed."
                    .into(),
                html: None,
            },
            rejected: Template {
                title: "Appointment rejected".into(),
                text: "The appointment between {{patient_name}} and Dr. {{doctor_name}} \
                       on {{date}} at {{time}} has been rejected."
                    .into(),
                html: None,
            },
            rescheduled: Template {
                title: "Appointment rescheduled".into(),
                text: "The appointment between {{patient_name}} and Dr. {{doctor_name}} \
                       has been rescheduled to {{date}} at {{time}}."
                    .into(),
                html: None,
            },
            cancelled: Template {
                title: "Appointment cancelled".into(),
                text: "The appointment between {{patient_name}} and Dr. {{doctor_name}} \
                       on {{date}} at {{time}} has been cancelled."
                    .into(),
                html: None,
            },
        }
    }
}
