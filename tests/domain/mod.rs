mod job_status_test;
