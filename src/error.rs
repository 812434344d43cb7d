use thiserror::Error as ThisError;

/// Different errors that the application can raise
#[derive(Debug, ThisError)]
pub enum RuntimeError {
    /// Error returned if we cannot assume a specific role
    #[error("failed to assume role")]
    AssumeRoleFailure(#[from] aws_sdk_sts::Error),
    /// Error returned if the credentials are missing after assuming a new role
    #[error("missing credentials in assume role response")]
    MissingCredentials,
    /// Error returned by the S3 API while fetching notification objects
    #[error("unexpected s3 error")]
    S3(#[from] aws_sdk_s3::Error),
    /// Error returned when the body of an S3 object cannot be read
    #[error("failed to read object body from s3://{bucket}/{key}")]
    ObjectBody {
        /// Bucket holding the object
        bucket: String,
        /// Unescaped key of the object
        key: String,
    },
    /// Error returned when an object cannot be decompressed
    #[error("failed to decompress object")]
    Decompress(#[from] std::io::Error),
    /// Error returned when a payload or object is not the JSON we expect
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    /// Error returned when a notification carries neither S3 nor SNS records
    #[error("invalid notification: {0}")]
    InvalidNotification(String),
    /// Error returned by the Lambda API when dispatching work
    #[error("unexpected lambda error")]
    Lambda(#[from] aws_sdk_lambda::Error),
    /// Error returned when an asynchronous invocation is not accepted
    #[error("invocation of {function} was rejected with status code {status}")]
    DispatchRejected {
        /// Target function
        function: String,
        /// Status code returned by the Lambda API
        status: i32,
    },
    /// Error returned by the AWS Support API
    #[error("unexpected support error")]
    Support(#[from] aws_sdk_support::Error),
    /// Error returned when a case lookup by id returns no case
    #[error("support case {0} not found")]
    MissingCase(String),
    /// Error returned by the AWS Organizations API
    #[error("unexpected organizations error")]
    Organizations(#[from] aws_sdk_organizations::Error),
    /// Error retuned by the DynamoDB API
    #[error("unexpected dynamodb error")]
    DynamoDB(#[from] aws_sdk_dynamodb::Error),
    /// Error returned when DynamoDB keeps rejecting part of a batch
    #[error("{0} items were left unprocessed by dynamodb")]
    UnprocessedItems(usize),
    /// Error returned when the environment cannot be parsed into settings
    #[error("invalid settings")]
    Settings(#[from] envy::Error),
    /// Error returned when a required environment variable is missing
    #[error("missing environment variable {0}")]
    MissingSetting(&'static str),
    /// Error returned when the look-back window falls outside the supported date range
    #[error("case look-back of {0} days is out of range")]
    InvalidLookback(i64),
    /// Error returned when the aggregator receives a payload it doesn't understand
    #[error("unrecognized trigger payload")]
    UnknownTrigger,
}
