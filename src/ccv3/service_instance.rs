use serde::Deserialize;

use crate::ccv3::query::Query;
use crate::ccv3::request::RequestParams;
use crate::ccv3::routes::names;
use crate::ccv3::Client;
use crate::error::ApiResult;

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceInstance {
    pub guid: String,
    #[serde(default)]
    pub name: String,
}

impl Client {
    pub async fn get_service_instances(&self, query: &[Query]) -> ApiResult<Vec<ServiceInstance>> {
        let params = RequestParams::new(names::GET_SERVICE_INSTANCES).query(query);
        let ((instances, _), warnings) = self.list_all(&params).await?;
        Ok((instances, warnings))
    }
}
