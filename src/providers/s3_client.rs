use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::Client;

pub struct S3ClientConfig<'a> {
    /// `None` sends unsigned requests for public objects.
    pub credentials: Option<(&'a str, &'a str)>,
    pub region: &'a str,
    pub endpoint_url: Option<&'a str>,
    pub force_path_style: bool,
}

pub async fn create_s3_client(config: &S3ClientConfig<'_>) -> Client {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.to_string()));

    loader = match config.credentials {
        Some((access_key_id, secret_access_key)) => loader.credentials_provider(Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "s3get",
        )),
        None => loader.no_credentials(),
    };

    if let Some(endpoint_url) = config.endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }

    let sdk_config = loader.load().await;
    let mut builder = S3ConfigBuilder::from(&sdk_config);

    if config.force_path_style {
        builder = builder.force_path_style(true);
    }

    Client::from_conf(builder.build())
}
